//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Verify subdomain-takeover fingerprints against the live internet
///
/// Reads the fingerprint table from a README, probes every vulnerable
/// service and reports which fingerprints still hold.
/// Use --explain on any command to learn what it does.
#[derive(Parser, Debug)]
#[command(name = "takeover")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, visible_alias = "format", global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Explain what this command does (educational mode)
    #[arg(long, global = true)]
    pub explain: bool,

    /// Increase verbosity
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse the fingerprint table and export it without probing
    Parse(ParseArgs),

    /// Probe every vulnerable fingerprint and report the verdicts
    Verify(VerifyArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Parse command
// ============================================================================

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// README containing the fingerprint table
    #[arg(short, long, env = "TAKEOVER_README")]
    pub readme: Option<PathBuf>,
}

// ============================================================================
// Verify command
// ============================================================================

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// README containing the fingerprint table
    #[arg(short, long, env = "TAKEOVER_README")]
    pub readme: Option<PathBuf>,

    /// Fingerprints verified at the same time
    #[arg(short, long, env = "TAKEOVER_WORKERS")]
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Give up on unfinished fingerprints after this many seconds
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Only verify these engines (repeatable, case-insensitive)
    #[arg(short, long = "engine", value_name = "NAME")]
    pub engines: Vec<String>,

    /// Replace the README table with the regenerated one (every row, so not with --engine)
    #[arg(long)]
    pub write: bool,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (readme, workers, timeout_secs, deadline_secs, output_format)
        key: String,

        /// Value to set
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_accepts_repeated_engines() {
        let cli = Cli::try_parse_from([
            "takeover", "-o", "json", "verify", "--engine", "Heroku", "-e", "Surge.sh", "--write",
        ])
        .unwrap();

        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Commands::Verify(args) => {
                assert_eq!(args.engines, ["Heroku", "Surge.sh"]);
                assert!(args.write);
            }
            other => panic!("expected verify, got {other:?}"),
        }
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["takeover", "-v", "-q", "parse"]).is_err());
    }
}
