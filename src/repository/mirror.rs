//! Ordered fallback across several repositories

use super::RemoteRepository;
use crate::error::ResolveError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tracing::debug;

/// Tries each repository in order, moving on only when one answers not-found
///
/// Any other error stops the chain: a flaky mirror must not be masked by a
/// later one serving a different file.
pub struct MirrorChain {
    repositories: Vec<Arc<dyn RemoteRepository>>,
    name: String,
}

impl MirrorChain {
    pub fn new(repositories: Vec<Arc<dyn RemoteRepository>>) -> Self {
        let name = repositories
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(", ");
        Self { repositories, name }
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

#[async_trait]
impl RemoteRepository for MirrorChain {
    async fn fetch(
        &self,
        relative_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ResolveError> {
        for repository in &self.repositories {
            match repository.fetch(relative_path, &mut *sink).await {
                Err(e) if e.is_not_found() => {
                    debug!(
                        repository = repository.name(),
                        path = relative_path,
                        "Not found, trying next repository"
                    );
                }
                other => return other,
            }
        }
        Err(ResolveError::not_found(relative_path))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
