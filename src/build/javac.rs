//! `javac` invocation with incremental staleness detection

use super::BuildError;
use crate::artifact::{classpath_paths, ResolvedArtifact};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::process::Command;
use tracing::{debug, info};

/// Result of a compile request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Every source already has an up-to-date class file
    UpToDate,
    /// Number of sources handed to the compiler
    Compiled(usize),
}

/// A configured `javac` invocation
#[derive(Debug, Clone)]
pub struct Javac {
    program: PathBuf,
    output_dir: PathBuf,
    classpath: Vec<PathBuf>,
    release: Option<u32>,
    options: Vec<String>,
}

impl Javac {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: PathBuf::from("javac"),
            output_dir: output_dir.into(),
            classpath: Vec::new(),
            release: None,
            options: Vec::new(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_classpath(mut self, artifacts: &[ResolvedArtifact]) -> Self {
        self.classpath = classpath_paths(artifacts);
        self
    }

    pub fn with_release(mut self, release: u32) -> Self {
        self.release = Some(release);
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Command-line arguments for compiling `sources` (program excluded)
    pub fn args(&self, sources: &[PathBuf]) -> Result<Vec<OsString>, BuildError> {
        let mut args: Vec<OsString> = vec![
            "-encoding".into(),
            "UTF8".into(),
            "-Xlint:-options".into(),
            "-Xlint:deprecation".into(),
            "-d".into(),
            self.output_dir.clone().into_os_string(),
        ];

        // Unchanged sources are not recompiled; their classes in the output
        // directory must stay visible to the ones that are.
        let class_path = self.classpath.iter().chain(std::iter::once(&self.output_dir));
        let joined =
            std::env::join_paths(class_path).map_err(|e| BuildError::Classpath(e.to_string()))?;
        args.push("--class-path".into());
        args.push(joined);
        if let Some(release) = self.release {
            args.push("--release".into());
            args.push(release.to_string().into());
        }
        args.extend(self.options.iter().map(OsString::from));
        args.extend(sources.iter().map(|s| s.clone().into_os_string()));
        Ok(args)
    }

    /// Sources whose class file is missing or older than the source
    ///
    /// Class files are matched by stem; nested classes (`Outer$Inner`) are
    /// skipped since they always come from their outer class's source.
    pub fn stale_sources(&self, sources: &[PathBuf]) -> Vec<PathBuf> {
        let classes = self.compiled_classes();
        sources
            .iter()
            .filter(|source| {
                let Some(stem) = source.file_stem().and_then(|s| s.to_str()) else {
                    return true;
                };
                match (classes.get(stem), modified(source)) {
                    (Some(class_time), Some(source_time)) => source_time > *class_time,
                    _ => true,
                }
            })
            .cloned()
            .collect()
    }

    fn compiled_classes(&self) -> HashMap<String, SystemTime> {
        let mut classes = HashMap::new();
        if !self.output_dir.exists() {
            return classes;
        }
        for entry in ignore::WalkBuilder::new(&self.output_dir)
            .standard_filters(false)
            .build()
            .filter_map(Result::ok)
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("class") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if stem.contains('$') {
                continue;
            }
            if let Some(time) = modified(path) {
                classes.insert(stem.to_string(), time);
            }
        }
        classes
    }

    /// Compiles stale sources; does nothing when all are up to date
    pub async fn compile(&self, sources: &[PathBuf]) -> Result<CompileOutcome, BuildError> {
        let stale = self.stale_sources(sources);
        if stale.is_empty() {
            debug!(output = %self.output_dir.display(), "All sources up to date");
            return Ok(CompileOutcome::UpToDate);
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| BuildError::Scan {
                path: self.output_dir.clone(),
                message: e.to_string(),
            })?;

        let args = self.args(&stale)?;
        info!(
            count = stale.len(),
            output = %self.output_dir.display(),
            "Compiling java files"
        );
        debug!(program = %self.program.display(), ?args, "Running compiler");

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .await
            .map_err(|source| BuildError::CompilerLaunch {
                program: self.program.display().to_string(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::CompilerFailed(status));
        }
        Ok(CompileOutcome::Compiled(stale.len()))
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
