//! mobility-cache - inspect fingerprinted pipeline caches
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use mobility_cache::cli::{Cli, Commands};
use mobility_cache::config::ConfigManager;
use mobility_cache::error::CacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load()?;

    init_logging(cli.verbose, &config.general.log_format);
    debug!("Loaded configuration from {}", config_manager.path().display());

    match cli.command {
        Commands::Fingerprint(args) => mobility_cache::cli::commands::fingerprint(args),
        Commands::Status(args) => mobility_cache::cli::commands::status(args, &config),
        Commands::Config(args) => {
            mobility_cache::cli::commands::config(args, &config, &config_manager)
        }
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, log_format: &str) {
    let filter = match verbose {
        0 => EnvFilter::new("mobility_cache=warn"),
        1 => EnvFilter::new("mobility_cache=info"),
        _ => EnvFilter::new("mobility_cache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if log_format == "json" {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
