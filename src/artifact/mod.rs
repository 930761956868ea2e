//! Artifact coordinates, resolved artifacts and classpath assembly

pub mod coordinate;

pub use coordinate::ArtifactCoordinate;

use serde::Serialize;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

/// An artifact whose file is confirmed present in the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    pub coordinate: ArtifactCoordinate,
    pub local_path: PathBuf,

    /// True when this resolution downloaded the file, false on a cache hit
    pub fetched: bool,
}

impl ResolvedArtifact {
    pub fn new(coordinate: ArtifactCoordinate, local_path: PathBuf, fetched: bool) -> Self {
        Self {
            coordinate,
            local_path,
            fetched,
        }
    }
}

/// Local file paths in classpath order
pub fn classpath_paths(artifacts: &[ResolvedArtifact]) -> Vec<PathBuf> {
    artifacts.iter().map(|a| a.local_path.clone()).collect()
}

/// Joins artifact paths with the platform classpath separator
pub fn join_classpath(artifacts: &[ResolvedArtifact]) -> Result<OsString, env::JoinPathsError> {
    env::join_paths(artifacts.iter().map(|a| a.local_path.as_path()))
}
