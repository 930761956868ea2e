//! artifetch - Maven artifact resolver and javac classpath builder
//!
//! Resolves a pinned list of Maven coordinates into a local cache, fetching
//! only what is missing, and hands back the classpath in dependency order.
//!
//! # Core Concepts
//!
//! - **Coordinate**: `group:artifact:version`, mapped to a deterministic path
//!   in the conventional Maven repository layout
//! - **Resolver**: cache-check-then-fetch with atomic writes; a download that
//!   fails halfway never leaves a file behind
//! - **Repository**: anything implementing [`RemoteRepository`]; HTTP mirrors
//!   can be chained so a not-found falls through to the next one
//!
//! # Example Usage
//!
//! ```no_run
//! use artifetch::{ArtifetchConfig, Manifest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArtifetchConfig::default();
//! let resolver = config.create_resolver()?;
//!
//! let classpath = resolver.resolve(&Manifest::builtin().dependencies).await?;
//! for artifact in &classpath {
//!     println!("{} -> {}", artifact.coordinate, artifact.local_path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`artifact`]: coordinates, resolved artifacts, classpath joining
//! - [`repository`]: HTTP, mirror-chain and in-memory repositories
//! - [`resolver`]: the resolver, checksum policy, compute-once classpath
//! - [`build`]: version derivation, source discovery, javac
//! - [`config`]: environment and manifest configuration

pub mod artifact;
pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod repository;
pub mod resolver;
pub mod util;

pub use artifact::{ArtifactCoordinate, ResolvedArtifact};
pub use config::{ArtifetchConfig, ConfigError, Manifest};
pub use error::ResolveError;
pub use repository::{HttpRepository, MirrorChain, MockRepository, RemoteRepository};
pub use resolver::{ArtifactResolver, ChecksumPolicy, ClasspathCache};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
