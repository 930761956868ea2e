use artifetch::cli::commands::{CliArgs, Commands};
use artifetch::cli::handlers::{handle_build, handle_resolve, handle_version};
use artifetch::util::logging::{init_logging, parse_level, LoggingConfig};
use artifetch::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("artifetch v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Resolve(resolve_args) => handle_resolve(resolve_args, &args.manifest).await,
        Commands::Build(build_args) => handle_build(build_args, &args.manifest).await,
        Commands::Version(version_args) => handle_version(version_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    init_logging(config);
}
