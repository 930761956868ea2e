//! Build plumbing around the resolved classpath
//!
//! - [`version`]: version string from an explicit value or CI metadata
//! - [`sources`]: glob-based source discovery
//! - [`javac`]: incremental `javac` invocation

pub mod javac;
pub mod sources;
pub mod version;

pub use javac::{CompileOutcome, Javac};
pub use sources::{discover, DEFAULT_SOURCE_GLOB};
pub use version::{derive_version, SNAPSHOT_VERSION};

use crate::error::ResolveError;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Invalid source pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Failed to scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    #[error("No source files matched {0:?}")]
    NoSources(Vec<String>),

    #[error("Classpath contains a path with the separator character: {0}")]
    Classpath(String),

    #[error("Failed to launch {program}: {source}")]
    CompilerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiler exited with {0}")]
    CompilerFailed(ExitStatus),
}
