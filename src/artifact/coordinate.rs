//! Maven artifact coordinates and their repository layout

use crate::error::ResolveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_EXTENSION: &str = "jar";

/// A published library version, identified by group, artifact and version
///
/// Two coordinates with equal fields are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group: String,
    #[serde(rename = "artifact")]
    pub artifact_id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl ArtifactCoordinate {
    pub fn new(
        group: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            classifier: None,
            extension: default_extension(),
        }
    }

    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Rejects empty segments and anything that could escape the cache root
    pub fn validate(&self) -> Result<(), ResolveError> {
        let mut fields = vec![
            ("group", self.group.as_str()),
            ("artifact", self.artifact_id.as_str()),
            ("version", self.version.as_str()),
            ("extension", self.extension.as_str()),
        ];
        if let Some(classifier) = &self.classifier {
            fields.push(("classifier", classifier.as_str()));
        }

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ResolveError::InvalidCoordinate(format!(
                    "{}: empty {}",
                    self, name
                )));
            }
            if value.contains(['/', '\\']) || value.contains("..") {
                return Err(ResolveError::InvalidCoordinate(format!(
                    "{}: {} '{}' contains a path separator or '..'",
                    self, name, value
                )));
            }
        }

        if self.group.split('.').any(str::is_empty) {
            return Err(ResolveError::InvalidCoordinate(format!(
                "{}: group has an empty segment",
                self
            )));
        }

        Ok(())
    }

    /// `clojure-1.11.1.jar`, `foo-1.0-sources.jar`
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, classifier, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    fn segments(&self) -> Vec<String> {
        let mut segments: Vec<String> = self.group.split('.').map(str::to_string).collect();
        segments.push(self.artifact_id.clone());
        segments.push(self.version.clone());
        segments.push(self.file_name());
        segments
    }

    /// Path relative to a repository root, always `/`-separated
    ///
    /// `org.clojure:clojure:1.11.1` maps to
    /// `org/clojure/clojure/1.11.1/clojure-1.11.1.jar`.
    pub fn relative_path(&self) -> String {
        self.segments().join("/")
    }

    /// Deterministic location of this artifact under a local cache root
    pub fn local_path(&self, cache_root: &Path) -> PathBuf {
        let mut path = cache_root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = ResolveError;

    /// Parses `group:artifact:version[:classifier]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        let coordinate = match parts.as_slice() {
            [group, artifact, version] => Self::new(*group, *artifact, *version),
            [group, artifact, version, classifier] => {
                Self::new(*group, *artifact, *version).with_classifier(*classifier)
            }
            _ => {
                return Err(ResolveError::InvalidCoordinate(format!(
                    "'{}' (expected group:artifact:version[:classifier])",
                    s
                )))
            }
        };
        coordinate.validate()?;
        Ok(coordinate)
    }
}
