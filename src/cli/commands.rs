use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build::DEFAULT_SOURCE_GLOB;
use crate::config::DEFAULT_MANIFEST;
use crate::resolver::ChecksumPolicy;

/// Resolve Maven artifacts into a local cache and build a javac classpath
#[derive(Parser, Debug)]
#[command(
    name = "artifetch",
    about = "Resolve Maven artifacts into a local cache and build a javac classpath",
    version,
    author,
    long_about = "artifetch downloads a pinned list of Maven artifacts into a local cache \
                  (skipping anything already cached), prints the resulting classpath, and \
                  can compile Java sources against it."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        short = 'm',
        long,
        global = true,
        value_name = "FILE",
        default_value = DEFAULT_MANIFEST,
        help = "Dependency manifest (the built-in list is used when the file is absent)"
    )]
    pub manifest: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Resolve dependencies and print the classpath",
        long_about = "Ensures every dependency is present in the local cache, downloading \
                      on cache miss, and prints the classpath in dependency order.\n\n\
                      Examples:\n  \
                      artifetch resolve\n  \
                      artifetch resolve --format json\n  \
                      artifetch resolve --cache-dir ~/.m2/repository --checksum sha1"
    )]
    Resolve(ResolveArgs),

    #[command(
        about = "Resolve dependencies and compile Java sources",
        long_about = "Resolves the classpath, discovers sources by glob, and runs javac on \
                      sources whose class files are missing or out of date.\n\n\
                      Examples:\n  \
                      artifetch build\n  \
                      artifetch build --out target/classes --sources 'src-java/**/*.java'"
    )]
    Build(BuildArgs),

    #[command(about = "Print the derived build version")]
    Version(VersionArgs),
}

#[derive(Parser, Debug, Clone, Default)]
pub struct ResolverArgs {
    #[arg(long, value_name = "DIR", help = "Local artifact cache root")]
    pub cache_dir: Option<PathBuf>,

    #[arg(
        short = 'r',
        long = "repository",
        value_name = "URL",
        help = "Repository base URL (repeatable, tried in order)"
    )]
    pub repositories: Vec<String>,

    #[arg(long, value_enum, help = "Verify downloads against published checksums")]
    pub checksum: Option<ChecksumArg>,

    #[arg(long, value_name = "SECONDS", help = "Per-request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "N", help = "Maximum concurrent downloads")]
    pub jobs: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub resolver: ResolverArgs,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "classpath",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub resolver: ResolverArgs,

    #[arg(
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Project root for source discovery"
    )]
    pub project_dir: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        default_value = "target/classes",
        help = "Output directory for class files (relative paths are under the project dir)"
    )]
    pub out: PathBuf,

    #[arg(
        short = 's',
        long = "sources",
        value_name = "GLOB",
        default_values_t = vec![DEFAULT_SOURCE_GLOB.to_string()],
        help = "Source glob relative to the project root (repeatable)"
    )]
    pub sources: Vec<String>,

    #[arg(long, value_name = "N", help = "Pass --release N to javac")]
    pub release: Option<u32>,

    #[arg(long, value_name = "PATH", default_value = "javac", help = "Compiler executable")]
    pub javac: PathBuf,

    #[arg(long, value_name = "VERSION", help = "Build version override")]
    pub version: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct VersionArgs {
    #[arg(value_name = "VERSION", help = "Explicit version (wins over CI metadata)")]
    pub version: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Classpath,
    Human,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Classpath => super::output::OutputFormat::Classpath,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumArg {
    None,
    Md5,
    Sha1,
    Sha256,
}

impl From<ChecksumArg> for ChecksumPolicy {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::None => ChecksumPolicy::None,
            ChecksumArg::Md5 => ChecksumPolicy::Md5,
            ChecksumArg::Sha1 => ChecksumPolicy::Sha1,
            ChecksumArg::Sha256 => ChecksumPolicy::Sha256,
        }
    }
}
