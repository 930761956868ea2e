//! HTTP repository client (Maven Central, Clojars, any Maven-layout mirror)

use super::RemoteRepository;
use crate::error::ResolveError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maven-layout repository served over HTTP(S)
///
/// Holds a pooled `reqwest::Client`; share it across resolvers with `Arc`.
pub struct HttpRepository {
    base_url: String,
    http_client: Client,
    timeout: Duration,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ResolveError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ResolveError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("artifetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ResolveError::network(&base_url, format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            http_client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, relative_path: &str) -> String {
        format!("{}/{}", self.base_url, relative_path.trim_start_matches('/'))
    }

    fn transport_error(&self, relative_path: &str, url: &str, err: reqwest::Error) -> ResolveError {
        let message = if err.is_timeout() {
            format!("request to {} timed out after {}s", url, self.timeout.as_secs())
        } else if err.is_connect() {
            format!("failed to connect to {}: {}", url, err)
        } else {
            format!("request to {} failed: {}", url, err)
        };
        ResolveError::network(relative_path, message)
    }
}

#[async_trait]
impl RemoteRepository for HttpRepository {
    async fn fetch(
        &self,
        relative_path: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, ResolveError> {
        let url = self.url_for(relative_path);
        debug!(url = %url, "GET");

        let mut response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(relative_path, &url, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            debug!(url = %url, status = %status, "Artifact not present in repository");
            return Err(ResolveError::not_found(relative_path));
        }
        if !status.is_success() {
            warn!(url = %url, status = %status, "Repository returned error status");
            return Err(ResolveError::network(
                relative_path,
                format!("HTTP {} from {}", status, url),
            ));
        }

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(relative_path, &url, e))?
        {
            sink.write_all(&chunk)
                .await
                .map_err(|e| ResolveError::io(relative_path, e))?;
            written += chunk.len() as u64;
        }
        sink.flush()
            .await
            .map_err(|e| ResolveError::io(relative_path, e))?;

        debug!(url = %url, bytes = written, "Download complete");
        Ok(written)
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
