pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, ResolveArgs, VersionArgs};
pub use output::{OutputFormat, OutputFormatter};
