//! Compute-once classpath for a fixed dependency list

use super::ArtifactResolver;
use crate::artifact::{ArtifactCoordinate, ResolvedArtifact};
use crate::error::ResolveError;
use tokio::sync::OnceCell;
use tracing::debug;

/// Resolves a fixed coordinate list on first use and reuses the result
///
/// The dependency list is immutable for the lifetime of the cache, so the
/// resolved classpath never needs invalidation. A failed resolution is not
/// stored; the next call tries again.
pub struct ClasspathCache {
    resolver: ArtifactResolver,
    coordinates: Vec<ArtifactCoordinate>,
    resolved: OnceCell<Vec<ResolvedArtifact>>,
}

impl ClasspathCache {
    pub fn new(resolver: ArtifactResolver, coordinates: Vec<ArtifactCoordinate>) -> Self {
        Self {
            resolver,
            coordinates,
            resolved: OnceCell::new(),
        }
    }

    pub fn coordinates(&self) -> &[ArtifactCoordinate] {
        &self.coordinates
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }

    pub async fn get(&self) -> Result<&[ResolvedArtifact], ResolveError> {
        let resolved = self
            .resolved
            .get_or_try_init(|| async {
                debug!(count = self.coordinates.len(), "Resolving classpath");
                self.resolver.resolve(&self.coordinates).await
            })
            .await?;
        Ok(resolved.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockRepository;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_resolves_once() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Arc::new(MockRepository::new());
        let coordinate = ArtifactCoordinate::new("org.clojure", "spec.alpha", "0.3.218");
        repo.insert(coordinate.relative_path(), b"spec".to_vec());

        let cache = ClasspathCache::new(
            ArtifactResolver::new(temp_dir.path(), repo.clone()),
            vec![coordinate],
        );
        assert!(!cache.is_resolved());

        let first = cache.get().await.unwrap().to_vec();
        let second = cache.get().await.unwrap().to_vec();

        assert!(cache.is_resolved());
        assert_eq!(first, second);
        assert_eq!(repo.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_not_memoized() {
        let temp_dir = TempDir::new().unwrap();
        let repo = Arc::new(MockRepository::new());
        let coordinate = ArtifactCoordinate::new("org.clojure", "spec.alpha", "0.3.218");

        let cache = ClasspathCache::new(
            ArtifactResolver::new(temp_dir.path(), repo.clone()),
            vec![coordinate.clone()],
        );
        assert!(cache.get().await.is_err());
        assert!(!cache.is_resolved());

        repo.insert(coordinate.relative_path(), b"spec".to_vec());
        assert_eq!(cache.get().await.unwrap().len(), 1);
    }
}
