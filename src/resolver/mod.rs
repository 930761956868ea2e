//! Artifact resolution into a local Maven-layout cache
//!
//! [`ArtifactResolver`] checks the cache for each coordinate and downloads
//! only on a miss. Downloads land in a uniquely named temporary file next to
//! the final path and are renamed into place once complete, so an interrupted
//! or failed transfer never leaves a file that a later run would take as valid.
//!
//! ```no_run
//! use artifetch::{ArtifactCoordinate, ArtifactResolver, HttpRepository};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(HttpRepository::new("https://repo1.maven.org/maven2")?);
//! let resolver = ArtifactResolver::new("target/deps", repository);
//!
//! let classpath = resolver
//!     .resolve(&[ArtifactCoordinate::new("org.clojure", "clojure", "1.11.1")])
//!     .await?;
//! println!("{}", classpath[0].local_path.display());
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod classpath;

pub use checksum::ChecksumPolicy;
pub use classpath::ClasspathCache;

use crate::artifact::{ArtifactCoordinate, ResolvedArtifact};
use crate::error::ResolveError;
use crate::repository::RemoteRepository;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_PARALLEL: usize = 4;

const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Resolves coordinates to files in a local cache, fetching on cache miss
pub struct ArtifactResolver {
    cache_root: PathBuf,
    repository: Arc<dyn RemoteRepository>,
    checksum: ChecksumPolicy,
    max_parallel: usize,
}

impl ArtifactResolver {
    pub fn new(cache_root: impl Into<PathBuf>, repository: Arc<dyn RemoteRepository>) -> Self {
        Self {
            cache_root: cache_root.into(),
            repository,
            checksum: ChecksumPolicy::None,
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }

    pub fn with_checksum(mut self, checksum: ChecksumPolicy) -> Self {
        self.checksum = checksum;
        self
    }

    /// Bounds concurrent downloads; 1 gives a strictly sequential loop
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn checksum(&self) -> ChecksumPolicy {
        self.checksum
    }

    pub fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    pub fn cache_path(&self, coordinate: &ArtifactCoordinate) -> PathBuf {
        coordinate.local_path(&self.cache_root)
    }

    /// Resolves every coordinate, returning artifacts in input order
    ///
    /// Fails on the first error in input order; remaining downloads are
    /// abandoned and their temporary files removed.
    pub async fn resolve(
        &self,
        coordinates: &[ArtifactCoordinate],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        if coordinates.is_empty() {
            return Err(ResolveError::EmptyInput);
        }
        for coordinate in coordinates {
            coordinate.validate()?;
        }

        let started = Instant::now();
        let resolved: Vec<ResolvedArtifact> = stream::iter(
            coordinates
                .iter()
                .map(|coordinate| self.resolve_one(coordinate))
                .collect::<Vec<_>>(),
        )
        .buffered(self.max_parallel)
            .try_collect()
            .await?;

        let fetched = resolved.iter().filter(|a| a.fetched).count();
        info!(
            artifacts = resolved.len(),
            fetched,
            cached = resolved.len() - fetched,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Classpath resolved"
        );
        Ok(resolved)
    }

    pub async fn resolve_one(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<ResolvedArtifact, ResolveError> {
        coordinate.validate()?;
        let local_path = self.cache_path(coordinate);

        if is_cached(&local_path).await {
            debug!(coordinate = %coordinate, path = %local_path.display(), "Cache hit");
            return Ok(ResolvedArtifact::new(coordinate.clone(), local_path, false));
        }

        debug!(coordinate = %coordinate, "Cache miss, fetching from {}", self.repository.name());
        let bytes = self.download(coordinate, &local_path).await.map_err(|e| {
            warn!(coordinate = %coordinate, error = %e, "Failed to resolve artifact");
            e
        })?;
        info!(coordinate = %coordinate, bytes, "Downloaded");

        Ok(ResolvedArtifact::new(coordinate.clone(), local_path, true))
    }

    async fn download(&self, coordinate: &ArtifactCoordinate, local_path: &Path) -> Result<u64, ResolveError> {
        let relative_path = coordinate.relative_path();
        let parent = local_path.parent().unwrap_or(&self.cache_root);
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ResolveError::io(parent, e))?;

        let temp_path = parent.join(format!(
            ".{}.{}.part",
            coordinate.file_name(),
            Uuid::new_v4().simple()
        ));
        let mut partial = PartialFile::new(temp_path.clone());

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| ResolveError::io(&temp_path, e))?;
        // The repository only sees an opaque sink; local write failures are
        // reported against the file actually being written.
        let written = self
            .repository
            .fetch(&relative_path, &mut file)
            .await
            .map_err(|e| match e {
                ResolveError::Io { source, .. } => ResolveError::io(&temp_path, source),
                other => other,
            })?;
        file.flush()
            .await
            .map_err(|e| ResolveError::io(&temp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| ResolveError::io(&temp_path, e))?;
        drop(file);

        if written == 0 {
            return Err(ResolveError::EmptyArtifact {
                path: relative_path,
            });
        }

        self.verify(&relative_path, &temp_path).await?;

        fs::rename(&temp_path, local_path)
            .await
            .map_err(|e| ResolveError::io(local_path, e))?;
        partial.persisted();

        Ok(written)
    }

    async fn verify(&self, relative_path: &str, temp_path: &Path) -> Result<(), ResolveError> {
        let (Some(sidecar_path), Some(mut hasher)) =
            (self.checksum.sidecar_path(relative_path), self.checksum.hasher())
        else {
            return Ok(());
        };
        let sidecar = match self.repository.fetch_text(&sidecar_path).await {
            Err(e) if e.is_not_found() => {
                return Err(ResolveError::MissingChecksum { path: sidecar_path })
            }
            other => other?,
        };

        let mut file = fs::File::open(temp_path)
            .await
            .map_err(|e| ResolveError::io(temp_path, e))?;
        let mut buf = vec![0u8; HASH_CHUNK_SIZE];
        loop {
            let n = file
                .read(&mut buf)
                .await
                .map_err(|e| ResolveError::io(temp_path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }

        self.checksum.check(relative_path, hasher.finish(), &sidecar)?;
        debug!(path = relative_path, policy = %self.checksum, "Checksum verified");
        Ok(())
    }
}

/// A cached file counts only if it is a non-empty regular file
async fn is_cached(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.is_file() && meta.len() > 0,
        Err(_) => false,
    }
}

/// Removes a temporary download on drop unless it was renamed into place
struct PartialFile {
    path: PathBuf,
    persisted: bool,
}

impl PartialFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn persisted(&mut self) {
        self.persisted = true;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.persisted {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %self.path.display(), error = %e, "Failed to remove partial download");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockFailure, MockRepository};
    use std::time::Duration;
    use tempfile::TempDir;

    fn clojure() -> ArtifactCoordinate {
        ArtifactCoordinate::new("org.clojure", "clojure", "1.11.1")
    }

    fn setup() -> (TempDir, Arc<MockRepository>) {
        let temp_dir = TempDir::new().unwrap();
        let repo = Arc::new(MockRepository::new());
        (temp_dir, repo)
    }

    fn leftover_parts(dir: &Path) -> Vec<PathBuf> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.to_string_lossy().ends_with(".part"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_cache_fetches_once() {
        let (temp_dir, repo) = setup();
        repo.insert(clojure().relative_path(), b"clojure-jar".to_vec());
        let resolver = ArtifactResolver::new(temp_dir.path(), repo.clone());

        let resolved = resolver.resolve(&[clojure()]).await.unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(repo.fetch_count(), 1);
        assert!(resolved[0].fetched);
        assert_eq!(resolved[0].coordinate, clojure());
        let meta = std::fs::metadata(&resolved[0].local_path).unwrap();
        assert!(meta.is_file());
        assert!(meta.len() > 0);
    }

    #[tokio::test]
    async fn test_second_resolve_is_cache_hit() {
        let (temp_dir, repo) = setup();
        repo.insert(clojure().relative_path(), b"clojure-jar".to_vec());
        let resolver = ArtifactResolver::new(temp_dir.path(), repo.clone());

        let first = resolver.resolve(&[clojure()]).await.unwrap();
        let second = resolver.resolve(&[clojure()]).await.unwrap();

        assert_eq!(repo.fetch_count(), 1);
        assert_eq!(first[0].local_path, second[0].local_path);
        assert!(!second[0].fetched);
    }

    #[tokio::test]
    async fn test_empty_file_is_not_a_cache_hit() {
        let (temp_dir, repo) = setup();
        repo.insert(clojure().relative_path(), b"clojure-jar".to_vec());
        let resolver = ArtifactResolver::new(temp_dir.path(), repo.clone());

        let path = resolver.cache_path(&clojure());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"").unwrap();

        let resolved = resolver.resolve_one(&clojure()).await.unwrap();
        assert!(resolved.fetched);
        assert_eq!(std::fs::read(&path).unwrap(), b"clojure-jar");
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let (temp_dir, repo) = setup();
        let resolver = ArtifactResolver::new(temp_dir.path(), repo);
        let err = resolver.resolve(&[]).await.unwrap_err();
        assert!(matches!(err, ResolveError::EmptyInput));
    }

    #[tokio::test]
    async fn test_not_found_leaves_no_file() {
        let (temp_dir, repo) = setup();
        let resolver = ArtifactResolver::new(temp_dir.path(), repo);

        let err = resolver.resolve(&[clojure()]).await.unwrap_err();

        assert!(err.is_not_found());
        let path = resolver.cache_path(&clojure());
        assert!(!path.exists());
        assert!(leftover_parts(path.parent().unwrap()).is_empty());
    }

    #[tokio::test]
    async fn test_interrupted_fetch_leaves_no_file() {
        let (temp_dir, repo) = setup();
        repo.insert(clojure().relative_path(), vec![7u8; 64]);
        repo.fail(clojure().relative_path(), MockFailure::Interrupted(16));
        let resolver = ArtifactResolver::new(temp_dir.path(), repo);

        let err = resolver.resolve(&[clojure()]).await.unwrap_err();

        assert!(matches!(err, ResolveError::Network { .. }));
        let path = resolver.cache_path(&clojure());
        assert!(!path.exists());
        assert!(leftover_parts(path.parent().unwrap()).is_empty());
    }

    #[tokio::test]
    async fn test_zero_byte_download_rejected() {
        let (temp_dir, repo) = setup();
        repo.insert(clojure().relative_path(), Vec::new());
        let resolver = ArtifactResolver::new(temp_dir.path(), repo);

        let err = resolver.resolve(&[clojure()]).await.unwrap_err();

        assert!(matches!(err, ResolveError::EmptyArtifact { .. }));
        assert!(!resolver.cache_path(&clojure()).exists());
    }

    #[tokio::test]
    async fn test_output_order_matches_input_despite_completion_order() {
        let (temp_dir, repo) = setup();
        let coordinates = vec![
            ArtifactCoordinate::new("org.clojure", "clojure", "1.11.1"),
            ArtifactCoordinate::new("org.clojure", "core.specs.alpha", "0.2.62"),
            ArtifactCoordinate::new("org.clojure", "spec.alpha", "0.3.218"),
        ];
        for c in &coordinates {
            repo.insert(c.relative_path(), c.to_string().into_bytes());
        }
        // First coordinate finishes last
        repo.delay(coordinates[0].relative_path(), Duration::from_millis(100));

        let resolver = ArtifactResolver::new(temp_dir.path(), repo).with_max_parallel(3);
        let resolved = resolver.resolve(&coordinates).await.unwrap();

        let order: Vec<_> = resolved.iter().map(|a| a.coordinate.clone()).collect();
        assert_eq!(order, coordinates);
    }

    #[tokio::test]
    async fn test_fail_fast_reports_first_error() {
        let (temp_dir, repo) = setup();
        let ok = ArtifactCoordinate::new("org.clojure", "clojure", "1.11.1");
        let missing = ArtifactCoordinate::new("org.clojure", "nope", "0.0.1");
        repo.insert(ok.relative_path(), b"jar".to_vec());

        let resolver = ArtifactResolver::new(temp_dir.path(), repo).with_max_parallel(1);
        let err = resolver.resolve(&[missing.clone(), ok]).await.unwrap_err();

        match err {
            ResolveError::NotFound { path } => assert_eq!(path, missing.relative_path()),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_coordinate_rejected_before_fetch() {
        let (temp_dir, repo) = setup();
        let resolver = ArtifactResolver::new(temp_dir.path(), repo.clone());
        let bad = ArtifactCoordinate::new("org.clojure", "../escape", "1.0");

        let err = resolver.resolve(&[clojure(), bad]).await.unwrap_err();

        assert!(matches!(err, ResolveError::InvalidCoordinate(_)));
        assert_eq!(repo.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_checksum_verified_on_download() {
        let (temp_dir, repo) = setup();
        let path = clojure().relative_path();
        repo.insert(path.clone(), b"hello".to_vec());
        repo.insert(format!("{}.md5", path), b"5d41402abc4b2a76b9719d911017c592".to_vec());

        let resolver =
            ArtifactResolver::new(temp_dir.path(), repo.clone()).with_checksum(ChecksumPolicy::Md5);
        let resolved = resolver.resolve(&[clojure()]).await.unwrap();

        assert!(resolved[0].local_path.exists());
        assert_eq!(repo.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_checksum_mismatch_leaves_no_file() {
        let (temp_dir, repo) = setup();
        let path = clojure().relative_path();
        repo.insert(path.clone(), b"tampered".to_vec());
        repo.insert(format!("{}.md5", path), b"5d41402abc4b2a76b9719d911017c592".to_vec());

        let resolver =
            ArtifactResolver::new(temp_dir.path(), repo).with_checksum(ChecksumPolicy::Md5);
        let err = resolver.resolve(&[clojure()]).await.unwrap_err();

        assert!(matches!(err, ResolveError::ChecksumMismatch { .. }));
        let local = resolver.cache_path(&clojure());
        assert!(!local.exists());
        assert!(leftover_parts(local.parent().unwrap()).is_empty());
    }

    #[test]
    fn test_max_parallel_floor_is_one() {
        let resolver = ArtifactResolver::new("/tmp/cache", Arc::new(MockRepository::new()))
            .with_max_parallel(0);
        assert_eq!(resolver.max_parallel(), 1);
    }
    #[tokio::test]
    async fn test_sha1_verified_across_hash_chunks() {
        let (temp_dir, repo) = setup();
        let path = clojure().relative_path();
        let bytes: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        let sidecar = ChecksumPolicy::Sha1.digest(&bytes).unwrap();
        repo.insert(path.clone(), bytes);
        repo.insert(format!("{}.sha1", path), sidecar.into_bytes());

        let resolver =
            ArtifactResolver::new(temp_dir.path(), repo.clone()).with_checksum(ChecksumPolicy::Sha1);
        let resolved = resolver.resolve(&[clojure()]).await.unwrap();

        assert!(resolved[0].fetched);
        assert_eq!(
            repo.fetched_paths(),
            vec![path.clone(), format!("{}.sha1", path)]
        );
    }

    #[tokio::test]
    async fn test_missing_sidecar_is_reported_as_checksum_error() {
        let (temp_dir, repo) = setup();
        repo.insert(clojure().relative_path(), b"hello".to_vec());

        let resolver =
            ArtifactResolver::new(temp_dir.path(), repo).with_checksum(ChecksumPolicy::Sha256);
        let err = resolver.resolve(&[clojure()]).await.unwrap_err();

        match err {
            ResolveError::MissingChecksum { path } => assert!(path.ends_with(".jar.sha256")),
            other => panic!("Expected MissingChecksum, got {:?}", other),
        }
        let local = resolver.cache_path(&clojure());
        assert!(!local.exists());
        assert!(leftover_parts(local.parent().unwrap()).is_empty());
    }

    struct SinkFailureRepository;

    #[async_trait::async_trait]
    impl RemoteRepository for SinkFailureRepository {
        async fn fetch(
            &self,
            relative_path: &str,
            _sink: &mut (dyn tokio::io::AsyncWrite + Unpin + Send),
        ) -> Result<u64, ResolveError> {
            Err(ResolveError::io(
                relative_path,
                std::io::Error::new(std::io::ErrorKind::Other, "No space left on device"),
            ))
        }

        fn name(&self) -> &str {
            "sink-failure"
        }
    }

    #[tokio::test]
    async fn test_write_failure_names_local_file() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = ArtifactResolver::new(temp_dir.path(), Arc::new(SinkFailureRepository));

        let err = resolver.resolve(&[clojure()]).await.unwrap_err();

        match err {
            ResolveError::Io { path, .. } => {
                let local = resolver.cache_path(&clojure());
                assert_eq!(path.parent(), local.parent());
                assert!(path.to_string_lossy().ends_with(".part"));
            }
            other => panic!("Expected Io, got {:?}", other),
        }
    }
}
