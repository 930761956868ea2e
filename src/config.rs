//! Configuration management for artifetch
//!
//! Settings come from three layers, later ones winning: `ARTIFETCH_*`
//! environment variables (with defaults), the project manifest
//! (`artifetch.toml`), and command-line flags.
//!
//! # Environment Variables
//!
//! - `ARTIFETCH_CACHE_DIR`: Cache root - default: "target/deps" (a leading `~/` expands to the home directory)
//! - `ARTIFETCH_REPOSITORIES`: Comma-separated repository base URLs - default: Maven Central, Clojars
//! - `ARTIFETCH_REQUEST_TIMEOUT`: Per-request timeout in seconds - default: "30"
//! - `ARTIFETCH_MAX_PARALLEL`: Concurrent downloads - default: "4"
//! - `ARTIFETCH_CHECKSUM`: Checksum policy (none|md5|sha1|sha256) - default: "none"
//! - `ARTIFETCH_LOG_LEVEL`: Logging level - default: "info"
//!
//! # Manifest
//!
//! ```toml
//! cache_dir = "target/deps"
//! repositories = ["https://repo1.maven.org/maven2", "https://repo.clojars.org"]
//! checksum = "md5"
//!
//! [[dependency]]
//! group = "org.clojure"
//! artifact = "clojure"
//! version = "1.11.1"
//! ```

use crate::artifact::ArtifactCoordinate;
use crate::error::ResolveError;
use crate::repository::{HttpRepository, MirrorChain, RemoteRepository, DEFAULT_REPOSITORIES};
use crate::resolver::{ArtifactResolver, ChecksumPolicy, DEFAULT_MAX_PARALLEL};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CACHE_DIR: &str = "target/deps";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MANIFEST: &str = "artifetch.toml";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to read manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Repository initialization failed: {0}")]
    RepositoryInit(#[from] ResolveError),
}

/// Main configuration structure for artifetch
#[derive(Debug, Clone)]
pub struct ArtifetchConfig {
    /// Root of the local Maven-layout artifact cache
    pub cache_dir: PathBuf,

    /// Repository base URLs, tried in order
    pub repositories: Vec<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum concurrent downloads
    pub max_parallel: usize,

    pub checksum: ChecksumPolicy,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ArtifetchConfig {
    /// Loads from `ARTIFETCH_*` environment variables, falling back to defaults
    fn default() -> Self {
        let cache_dir = env::var("ARTIFETCH_CACHE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(|v| expand_home(&v))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR));

        let repositories = env::var("ARTIFETCH_REPOSITORIES")
            .ok()
            .map(|v| split_list(&v))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_REPOSITORIES.iter().map(|s| s.to_string()).collect());

        let request_timeout_secs = env::var("ARTIFETCH_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let max_parallel = env::var("ARTIFETCH_MAX_PARALLEL")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_PARALLEL);

        let checksum = env::var("ARTIFETCH_CHECKSUM")
            .ok()
            .and_then(|v| v.parse::<ChecksumPolicy>().ok())
            .unwrap_or_default();

        let log_level = env::var("ARTIFETCH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            cache_dir,
            repositories,
            request_timeout_secs,
            max_parallel,
            checksum,
            log_level,
        }
    }
}

impl ArtifetchConfig {
    /// Overlays the optional settings a manifest carries
    pub fn apply_manifest(&mut self, manifest: &Manifest) {
        if let Some(dir) = &manifest.cache_dir {
            self.cache_dir = expand_home(&dir.to_string_lossy());
        }
        if let Some(repositories) = &manifest.repositories {
            self.repositories = repositories.clone();
        }
        if let Some(checksum) = manifest.checksum {
            self.checksum = checksum;
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` naming the first bad setting
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_parallel == 0 || self.max_parallel > 64 {
            return Err(ConfigError::ValidationFailed(
                "Max parallel downloads must be between 1 and 64".to_string(),
            ));
        }

        if self.repositories.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one repository URL is required".to_string(),
            ));
        }
        for url in &self.repositories {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Repository URL must start with http:// or https://: {}",
                    url
                )));
            }
        }

        if self.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Cache directory cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Builds the repository chain described by this configuration
    pub fn create_repository(&self) -> Result<Arc<dyn RemoteRepository>, ConfigError> {
        let timeout = Duration::from_secs(self.request_timeout_secs);
        let mut repositories: Vec<Arc<dyn RemoteRepository>> = Vec::new();
        for url in &self.repositories {
            repositories.push(Arc::new(HttpRepository::with_timeout(url.as_str(), timeout)?));
        }

        if repositories.len() == 1 {
            return Ok(repositories.remove(0));
        }
        Ok(Arc::new(MirrorChain::new(repositories)))
    }

    /// Creates a resolver against the configured cache and repositories
    pub fn create_resolver(&self) -> Result<ArtifactResolver, ConfigError> {
        let repository = self.create_repository()?;
        Ok(ArtifactResolver::new(self.cache_dir.clone(), repository)
            .with_checksum(self.checksum)
            .with_max_parallel(self.max_parallel))
    }
}

impl fmt::Display for ArtifetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifetch Configuration:")?;
        writeln!(f, "  Cache Dir: {}", self.cache_dir.display())?;
        writeln!(f, "  Repositories: {}", self.repositories.join(", "))?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Parallel: {}", self.max_parallel)?;
        writeln!(f, "  Checksum: {}", self.checksum)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

/// Project manifest listing dependencies and optional resolver settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repositories: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<ChecksumPolicy>,

    #[serde(default, rename = "dependency")]
    pub dependencies: Vec<ArtifactCoordinate>,
}

impl Manifest {
    /// The dependency list used when a project carries no manifest
    pub fn builtin() -> Self {
        Self {
            dependencies: vec![
                ArtifactCoordinate::new("org.clojure", "clojure", "1.11.1"),
                ArtifactCoordinate::new("org.clojure", "core.specs.alpha", "0.2.62"),
                ArtifactCoordinate::new("org.clojure", "spec.alpha", "0.3.218"),
            ],
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::parse(&content).map_err(|source| ConfigError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Loads `path` if it exists, otherwise the built-in list
    pub fn load_or_builtin(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::builtin())
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dependencies.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Manifest declares no dependencies".to_string(),
            ));
        }
        for dependency in &self.dependencies {
            dependency
                .validate()
                .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;
        }
        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}
