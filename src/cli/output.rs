//! Output formatting for resolved classpaths
//!
//! `classpath` prints the joined path list alone so the command can be used
//! in shell substitution (`javac -cp "$(artifetch resolve)" ...`).

use anyhow::{Context, Result};
use serde::Serialize;

use crate::artifact::{join_classpath, ResolvedArtifact};
use crate::config::ArtifetchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Platform-separated path list on one line
    Classpath,
    /// One artifact per line with its cache status
    Human,
    Json,
    Yaml,
}

#[derive(Serialize)]
struct ClasspathReport {
    cache_dir: String,
    classpath: String,
    artifacts: Vec<ArtifactEntry>,
}

#[derive(Serialize)]
struct ArtifactEntry {
    coordinate: String,
    path: String,
    fetched: bool,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_classpath(
        &self,
        artifacts: &[ResolvedArtifact],
        config: &ArtifetchConfig,
    ) -> Result<String> {
        let joined = join_classpath(artifacts)
            .context("Artifact path contains the classpath separator")?
            .to_string_lossy()
            .to_string();

        match self.format {
            OutputFormat::Classpath => Ok(joined),
            OutputFormat::Human => Ok(self.format_human(artifacts, config)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&Self::report(artifacts, config, joined))
                    .context("Failed to serialize classpath to JSON")
            }
            OutputFormat::Yaml => serde_yaml::to_string(&Self::report(artifacts, config, joined))
                .context("Failed to serialize classpath to YAML"),
        }
    }

    fn report(
        artifacts: &[ResolvedArtifact],
        config: &ArtifetchConfig,
        classpath: String,
    ) -> ClasspathReport {
        ClasspathReport {
            cache_dir: config.cache_dir.display().to_string(),
            classpath,
            artifacts: artifacts
                .iter()
                .map(|a| ArtifactEntry {
                    coordinate: a.coordinate.to_string(),
                    path: a.local_path.display().to_string(),
                    fetched: a.fetched,
                })
                .collect(),
        }
    }

    fn format_human(&self, artifacts: &[ResolvedArtifact], config: &ArtifetchConfig) -> String {
        let mut output = String::new();
        let fetched = artifacts.iter().filter(|a| a.fetched).count();
        output.push_str(&format!(
            "Resolved {} artifacts ({} downloaded, {} cached) in {}\n\n",
            artifacts.len(),
            fetched,
            artifacts.len() - fetched,
            config.cache_dir.display()
        ));

        let width = artifacts
            .iter()
            .map(|a| a.coordinate.to_string().len())
            .max()
            .unwrap_or(0);
        for artifact in artifacts {
            let status = if artifact.fetched { "downloaded" } else { "cached" };
            output.push_str(&format!(
                "  {:<width$}  {:<10}  {}\n",
                artifact.coordinate.to_string(),
                status,
                artifact.local_path.display(),
                width = width
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactCoordinate;
    use crate::resolver::ChecksumPolicy;
    use std::path::{Path, PathBuf};

    fn config() -> ArtifetchConfig {
        ArtifetchConfig {
            cache_dir: PathBuf::from("/cache"),
            repositories: vec!["https://repo1.maven.org/maven2".to_string()],
            request_timeout_secs: 30,
            max_parallel: 4,
            checksum: ChecksumPolicy::None,
            log_level: "info".to_string(),
        }
    }

    fn artifacts() -> Vec<ResolvedArtifact> {
        let clojure = ArtifactCoordinate::new("org.clojure", "clojure", "1.11.1");
        let spec = ArtifactCoordinate::new("org.clojure", "spec.alpha", "0.3.218");
        vec![
            ResolvedArtifact::new(clojure.clone(), clojure.local_path(Path::new("/cache")), true),
            ResolvedArtifact::new(spec.clone(), spec.local_path(Path::new("/cache")), false),
        ]
    }

    #[test]
    #[cfg(unix)]
    fn test_classpath_format() {
        let output = OutputFormatter::new(OutputFormat::Classpath)
            .format_classpath(&artifacts(), &config())
            .unwrap();
        assert_eq!(
            output,
            "/cache/org/clojure/clojure/1.11.1/clojure-1.11.1.jar:\
             /cache/org/clojure/spec.alpha/0.3.218/spec.alpha-0.3.218.jar"
        );
    }

    #[test]
    fn test_json_format() {
        let output = OutputFormatter::new(OutputFormat::Json)
            .format_classpath(&artifacts(), &config())
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["artifacts"][0]["coordinate"], "org.clojure:clojure:1.11.1");
        assert_eq!(value["artifacts"][0]["fetched"], true);
        assert_eq!(value["artifacts"][1]["fetched"], false);
        assert_eq!(value["cache_dir"], "/cache");
    }

    #[test]
    fn test_yaml_format() {
        let output = OutputFormatter::new(OutputFormat::Yaml)
            .format_classpath(&artifacts(), &config())
            .unwrap();
        assert!(output.contains("org.clojure:spec.alpha:0.3.218"));
        assert!(output.contains("fetched: true"));
    }

    #[test]
    fn test_human_format() {
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_classpath(&artifacts(), &config())
            .unwrap();
        assert!(output.contains("Resolved 2 artifacts (1 downloaded, 1 cached)"));
        assert!(output.contains("downloaded"));
        assert!(output.contains("spec.alpha-0.3.218.jar"));
    }
}
