use super::RemoteRepository;
use crate::error::ResolveError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// In-memory repository for tests and offline runs
pub struct MockRepository {
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<HashMap<String, MockFailure>>,
    delays: Mutex<HashMap<String, Duration>>,
    fetches: Mutex<Vec<String>>,
    fetch_count: AtomicUsize,
    name: String,
}

#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Fails before writing anything
    Network,

    /// Writes this many bytes of the stored artifact, then fails
    Interrupted(usize),
}

impl MockRepository {
    pub fn new() -> Self {
        Self::with_name("MockRepository")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            artifacts: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            fetches: Mutex::new(Vec::new()),
            fetch_count: AtomicUsize::new(0),
            name: name.into(),
        }
    }

    pub fn insert(&self, relative_path: impl Into<String>, bytes: Vec<u8>) {
        self.artifacts
            .lock()
            .unwrap()
            .insert(relative_path.into(), bytes);
    }

    pub fn fail(&self, relative_path: impl Into<String>, failure: MockFailure) {
        self.failures
            .lock()
            .unwrap()
            .insert(relative_path.into(), failure);
    }

    /// Delays the response for a path, to force out-of-order completion
    pub fn delay(&self, relative_path: impl Into<String>, delay: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(relative_path.into(), delay);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Paths requested so far, in request order
    pub fn fetched_paths(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteRepository for MockRepository {
    async fn fetch(
        &self,
        relative_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ResolveError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.fetches.lock().unwrap().push(relative_path.to_string());

        let delay = self.delays.lock().unwrap().get(relative_path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().unwrap().get(relative_path).cloned();
        let bytes = self.artifacts.lock().unwrap().get(relative_path).cloned();

        match (failure, bytes) {
            (Some(MockFailure::Network), _) => Err(ResolveError::network(
                relative_path,
                "connection reset by peer",
            )),
            (Some(MockFailure::Interrupted(partial)), bytes) => {
                let bytes = bytes.unwrap_or_default();
                let partial = partial.min(bytes.len());
                sink.write_all(&bytes[..partial])
                    .await
                    .map_err(|e| ResolveError::io(relative_path, e))?;
                Err(ResolveError::network(
                    relative_path,
                    format!("connection closed after {} bytes", partial),
                ))
            }
            (None, Some(bytes)) => {
                sink.write_all(&bytes)
                    .await
                    .map_err(|e| ResolveError::io(relative_path, e))?;
                Ok(bytes.len() as u64)
            }
            (None, None) => Err(ResolveError::not_found(relative_path)),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
