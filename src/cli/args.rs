//! CLI argument definitions using clap derive

use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// mobility-cache - inspect fingerprinted pipeline caches
///
/// Computes input fingerprints and reports whether cached artifacts are
/// fresh, without building anything.
#[derive(Parser, Debug)]
#[command(name = "mobility-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MOBILITY_CACHE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the fingerprint of a JSON input description
    Fingerprint(FingerprintArgs),

    /// Report where a node's artifacts live and whether they are fresh
    Status(StatusArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the fingerprint command
#[derive(Parser, Debug)]
pub struct FingerprintArgs {
    /// JSON file holding the input description ("-" for stdin)
    pub inputs: PathBuf,

    /// Also print the canonical form that was digested
    #[arg(long)]
    pub canonical: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["inputs", "fingerprint"])))]
pub struct StatusArgs {
    /// JSON file holding the input description
    #[arg(short, long)]
    pub inputs: Option<PathBuf>,

    /// Use this fingerprint instead of computing one
    #[arg(long)]
    pub fingerprint: Option<String>,

    /// Nominal location: one path, or KEY=PATH pairs for a named group
    #[arg(required = true)]
    pub location: Vec<String>,

    /// Read a lone location argument as a one-member KEY=PATH group
    #[arg(long)]
    pub named: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the status command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (fresh/stale only)
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_fingerprint() {
        let cli = Cli::parse_from(["mobility-cache", "fingerprint", "inputs.json", "--canonical"]);
        match cli.command {
            Commands::Fingerprint(args) => {
                assert_eq!(args.inputs, PathBuf::from("inputs.json"));
                assert!(args.canonical);
            }
            _ => panic!("expected Fingerprint command"),
        }
    }

    #[test]
    fn cli_parses_status_named() {
        let cli = Cli::parse_from([
            "mobility-cache",
            "status",
            "--fingerprint",
            "abc",
            "stops=stops.csv",
            "routes=routes.csv",
        ]);
        match cli.command {
            Commands::Status(args) => {
                assert_eq!(args.fingerprint.as_deref(), Some("abc"));
                assert_eq!(args.location.len(), 2);
                assert!(!args.named);
            }
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn cli_status_requires_source() {
        let result = Cli::try_parse_from(["mobility-cache", "status", "result.bin"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_status_sources_conflict() {
        let result = Cli::try_parse_from([
            "mobility-cache",
            "status",
            "--inputs",
            "i.json",
            "--fingerprint",
            "abc",
            "result.bin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["mobility-cache", "config", "path"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["mobility-cache", "-v", "config", "path"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["mobility-cache", "-vv", "config", "path"]);
        assert_eq!(cli.verbose, 2);
    }
}
