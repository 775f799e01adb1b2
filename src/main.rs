use deployprep::cli::commands::{CliArgs, Commands};
use deployprep::cli::handlers::{handle_check, handle_configure};
use deployprep::util::logging::{init_logging, parse_level, LoggingConfig};
use deployprep::{DeployPrepConfig, VERSION};

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = DeployPrepConfig::default();
    init_logging_from_args(&args, &config);

    debug!("deployprep v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let exit_code = match &args.command {
        Commands::Configure(configure_args) => handle_configure(configure_args, &config),
        Commands::Check(check_args) => handle_check(check_args, &config).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs, config: &DeployPrepConfig) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        parse_level(&config.log_level)
    };

    let use_json = std::env::var("DEPLOYPREP_LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level,
        use_json,
        ..LoggingConfig::default()
    });
}
