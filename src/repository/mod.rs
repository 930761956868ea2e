//! Remote artifact repositories
//!
//! A [`RemoteRepository`] streams the bytes stored at a repository-relative
//! path (Maven layout) into an async sink. Implementations distinguish a
//! missing artifact ([`ResolveError::NotFound`]) from a failed transfer
//! ([`ResolveError::Network`]).

pub mod http;
pub mod mirror;
pub mod mock;

pub use http::HttpRepository;
pub use mirror::MirrorChain;
pub use mock::{MockFailure, MockRepository};

use crate::error::ResolveError;
use async_trait::async_trait;
use tokio::io::AsyncWrite;

pub const MAVEN_CENTRAL_URL: &str = "https://repo1.maven.org/maven2";
pub const CLOJARS_URL: &str = "https://repo.clojars.org";

/// Repositories tried when nothing else is configured, in order
pub const DEFAULT_REPOSITORIES: &[&str] = &[MAVEN_CENTRAL_URL, CLOJARS_URL];

#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Streams the artifact at `relative_path` into `sink`, returning the byte count
    ///
    /// `NotFound` must be reported before any byte reaches the sink.
    async fn fetch(
        &self,
        relative_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ResolveError>;

    /// Fetches a small text resource such as a checksum sidecar
    async fn fetch_text(&self, relative_path: &str) -> Result<String, ResolveError> {
        let mut buf: Vec<u8> = Vec::new();
        self.fetch(relative_path, &mut buf).await?;
        String::from_utf8(buf).map_err(|e| {
            ResolveError::network(relative_path, format!("response is not UTF-8: {}", e))
        })
    }

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    struct StaticRepository;

    #[async_trait]
    impl RemoteRepository for StaticRepository {
        async fn fetch(
            &self,
            relative_path: &str,
            sink: &mut (dyn AsyncWrite + Unpin + Send),
        ) -> Result<u64, ResolveError> {
            if relative_path.ends_with(".md5") {
                sink.write_all(b"abc123  file.jar\n")
                    .await
                    .map_err(|e| ResolveError::io(relative_path, e))?;
                return Ok(17);
            }
            Err(ResolveError::not_found(relative_path))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    #[tokio::test]
    async fn test_fetch_text_default_impl() {
        let repo = StaticRepository;
        let text = repo.fetch_text("a/b/1/b-1.jar.md5").await.unwrap();
        assert_eq!(text, "abc123  file.jar\n");
        assert_eq!(repo.name(), "static");
    }

    #[tokio::test]
    async fn test_fetch_text_propagates_not_found() {
        let repo = StaticRepository;
        let err = repo.fetch_text("a/b/1/b-1.jar").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_default_repositories_order() {
        assert_eq!(DEFAULT_REPOSITORIES[0], MAVEN_CENTRAL_URL);
        assert_eq!(DEFAULT_REPOSITORIES[1], CLOJARS_URL);
    }
}
