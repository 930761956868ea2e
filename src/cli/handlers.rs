//! Subcommand handlers; each returns the process exit code

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::commands::{BuildArgs, ResolveArgs, ResolverArgs, VersionArgs};
use super::output::OutputFormatter;
use crate::build::{derive_version, discover, BuildError, CompileOutcome, Javac};
use crate::config::{ArtifetchConfig, ConfigError, Manifest};
use crate::resolver::ClasspathCache;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;

/// Layers environment, manifest and command-line settings
pub fn load_config(
    manifest_path: &Path,
    args: &ResolverArgs,
) -> Result<(ArtifetchConfig, Manifest), ConfigError> {
    let manifest = Manifest::load_or_builtin(manifest_path)?;
    let mut config = ArtifetchConfig::default();
    config.apply_manifest(&manifest);

    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    if !args.repositories.is_empty() {
        config.repositories = args.repositories.clone();
    }
    if let Some(checksum) = args.checksum {
        config.checksum = checksum.into();
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }
    if let Some(jobs) = args.jobs {
        config.max_parallel = jobs;
    }

    config.validate()?;
    debug!("{}", config);
    Ok((config, manifest))
}

fn classpath_cache(
    manifest_path: &Path,
    args: &ResolverArgs,
) -> Result<(ArtifetchConfig, ClasspathCache), i32> {
    let (config, manifest) = load_config(manifest_path, args).map_err(|e| {
        error!("{}", e);
        EXIT_CONFIG
    })?;
    let resolver = config.create_resolver().map_err(|e| {
        error!("{}", e);
        EXIT_CONFIG
    })?;
    Ok((config, ClasspathCache::new(resolver, manifest.dependencies)))
}

pub async fn handle_resolve(args: &ResolveArgs, manifest_path: &Path) -> i32 {
    let (config, classpath) = match classpath_cache(manifest_path, &args.resolver) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let artifacts = match classpath.get().await {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("Dependency resolution failed: {}", e);
            return EXIT_FAILURE;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_classpath(artifacts, &config) {
        Ok(output) => {
            println!("{}", output);
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            EXIT_FAILURE
        }
    }
}

pub async fn handle_build(args: &BuildArgs, manifest_path: &Path) -> i32 {
    let version = derive_version(args.version.as_deref());
    info!(version = %version, "Building");

    let (_, classpath) = match classpath_cache(manifest_path, &args.resolver) {
        Ok(v) => v,
        Err(code) => return code,
    };

    match build(args, &classpath).await {
        Ok(CompileOutcome::UpToDate) => {
            info!("Nothing to compile, classes are up to date");
            EXIT_SUCCESS
        }
        Ok(CompileOutcome::Compiled(count)) => {
            info!(count, output = %output_dir(args).display(), "Compiled");
            EXIT_SUCCESS
        }
        Err(e) => {
            error!("Build failed: {}", e);
            EXIT_FAILURE
        }
    }
}

async fn build(args: &BuildArgs, classpath: &ClasspathCache) -> Result<CompileOutcome, BuildError> {
    let artifacts = classpath.get().await?;

    let sources = discover(&args.project_dir, &args.sources)?;
    if sources.is_empty() {
        return Err(BuildError::NoSources(args.sources.clone()));
    }

    let mut javac = Javac::new(output_dir(args))
        .with_program(&args.javac)
        .with_classpath(artifacts);
    if let Some(release) = args.release {
        javac = javac.with_release(release);
    }
    javac.compile(&sources).await
}

/// Class output directory; a relative `--out` lives under the project root
pub fn output_dir(args: &BuildArgs) -> PathBuf {
    if args.out.is_absolute() {
        args.out.clone()
    } else {
        args.project_dir.join(&args.out)
    }
}

pub fn handle_version(args: &VersionArgs) -> i32 {
    println!("{}", derive_version(args.version.as_deref()));
    EXIT_SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::ChecksumArg;
    use crate::resolver::ChecksumPolicy;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_cli_flags_override_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_path = temp_dir.path().join("artifetch.toml");
        fs::write(
            &manifest_path,
            r#"
cache_dir = "from-manifest"
checksum = "md5"

[[dependency]]
group = "org.clojure"
artifact = "clojure"
version = "1.11.1"
"#,
        )
        .unwrap();

        let args = ResolverArgs {
            cache_dir: Some(PathBuf::from("from-cli")),
            repositories: vec!["https://mirror.example.com/maven2".to_string()],
            checksum: Some(ChecksumArg::Sha256),
            timeout: Some(10),
            jobs: Some(1),
        };

        let (config, manifest) = load_config(&manifest_path, &args).unwrap();
        assert_eq!(config.cache_dir, PathBuf::from("from-cli"));
        assert_eq!(config.repositories, vec!["https://mirror.example.com/maven2"]);
        assert_eq!(config.checksum, ChecksumPolicy::Sha256);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.max_parallel, 1);
        assert_eq!(manifest.dependencies.len(), 1);
    }

    #[test]
    #[serial]
    fn test_invalid_cli_value_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let args = ResolverArgs {
            timeout: Some(0),
            ..Default::default()
        };
        let result = load_config(&temp_dir.path().join("missing.toml"), &args);
        assert!(matches!(result, Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn test_malformed_manifest_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let manifest_path = temp_dir.path().join("artifetch.toml");
        fs::write(&manifest_path, "[[dependency]]\ngroup = 1\n").unwrap();

        let result = load_config(&manifest_path, &ResolverArgs::default());
        assert!(matches!(result, Err(ConfigError::ManifestParse { .. })));
    }
    fn build_args(project_dir: &str, out: &str) -> BuildArgs {
        use crate::cli::commands::{CliArgs, Commands};
        use clap::Parser;

        let args = CliArgs::parse_from(["artifetch", "build", "--project-dir", project_dir, "--out", out]);
        match args.command {
            Commands::Build(build_args) => build_args,
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_relative_out_is_under_project_dir() {
        let args = build_args("../p", "target/classes");
        assert_eq!(output_dir(&args), PathBuf::from("../p/target/classes"));
    }

    #[test]
    #[cfg(unix)]
    fn test_absolute_out_is_kept() {
        let args = build_args("../p", "/tmp/classes");
        assert_eq!(output_dir(&args), PathBuf::from("/tmp/classes"));
    }
}
