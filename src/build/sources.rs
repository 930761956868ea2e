//! Source file discovery by glob

use super::BuildError;
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_SOURCE_GLOB: &str = "src-java/**/*.java";

/// Files under `root` matching any of `patterns`, sorted and deduplicated
///
/// Patterns use gitignore glob syntax relative to `root`. Ignore files and
/// hidden-file rules are not applied: only the patterns decide.
pub fn discover(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, BuildError> {
    if !root.exists() {
        return Err(BuildError::Scan {
            path: root.to_path_buf(),
            message: "directory does not exist".to_string(),
        });
    }

    let mut override_builder = OverrideBuilder::new(root);
    for pattern in patterns {
        override_builder
            .add(pattern)
            .map_err(|e| BuildError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
    }
    let overrides = override_builder
        .build()
        .map_err(|e| BuildError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;

    let mut files = Vec::new();
    for result in WalkBuilder::new(root)
        .standard_filters(false)
        .overrides(overrides)
        .build()
    {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    files.dedup();
    debug!(root = %root.display(), count = files.len(), "Discovered source files");
    Ok(files)
}
