//! Error types for artifact resolution
//!
//! `ResolveError` separates a missing artifact (`NotFound`) from a transient
//! transport failure (`Network`) so callers can tell a bad coordinate apart
//! from a flaky connection.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while resolving artifacts into the local cache
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The fetch failed in transit (timeout, connection refused, DNS, bad status)
    #[error("Network error fetching {path}: {message}")]
    Network { path: String, message: String },

    /// Every configured repository answered not-found for this path
    #[error("Artifact not found: {path} (check the coordinate and version)")]
    NotFound { path: String },

    /// Local cache failure (permissions, disk full, rename)
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Downloaded bytes did not match the published checksum
    #[error("Checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// The checksum sidecar for this policy is not published for the artifact
    #[error("Checksum file not found: {path} (the repository does not publish this digest; choose another checksum policy)")]
    MissingChecksum { path: String },

    /// Repository answered with an empty body
    #[error("Downloaded artifact is empty: {path}")]
    EmptyArtifact { path: String },

    #[error("Invalid artifact coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("No artifact coordinates to resolve")]
    EmptyInput,
}

impl ResolveError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        ResolveError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn network(path: impl Into<String>, message: impl Into<String>) -> Self {
        ResolveError::Network {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        ResolveError::NotFound { path: path.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveError::NotFound { .. })
    }

    /// Whether retrying later could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ResolveError::Network { .. })
    }
}
