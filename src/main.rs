use redock::cli::commands::{CliArgs, Commands};
use redock::cli::handlers::{dispatch, handle_suppressed, load_config, report, skip_requested};
use redock::util::logging::{init_logging, json_from_env, resolve_level, LoggingConfig};
use redock::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, warn};

/// Conventional exit code for a process interrupted by SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let config = load_config(&args);

    // Log records go to the project's log file only for workflow commands
    let log_file = match (&config, &args.command) {
        (Ok(config), Commands::Run(_) | Commands::Stop) => config.log_path(),
        _ => None,
    };
    init_logging(LoggingConfig {
        level: resolve_level(args.log_level.as_deref(), args.verbose, args.quiet, |key| {
            env::var(key).ok()
        }),
        use_json: json_from_env(),
        console_progress: !args.quiet,
        log_file,
        ..Default::default()
    });

    debug!("redock v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    // The skip switch wins even over a broken configuration
    if skip_requested(&args.command, |key| env::var(key).ok()) {
        if let Err(e) = &config {
            debug!("Ignoring configuration error: {:#}", e);
        }
        std::process::exit(handle_suppressed(args.quiet));
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => std::process::exit(report(Err(e))),
    };

    let exit_code = tokio::select! {
        code = dispatch(&args, &config) => code,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            eprintln!("\nInterrupted");
            INTERRUPTED_EXIT_CODE
        }
    };

    std::process::exit(exit_code);
}
