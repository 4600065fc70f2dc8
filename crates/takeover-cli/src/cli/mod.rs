//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let terminal = std::io::stderr().is_terminal();
    let progress_bar = !cli.quiet && terminal;
    init_tracing(cli.verbose, cli.quiet, progress_bar, terminal && !cli.no_color);

    // Load configuration
    let config = Config::load()?;

    // Determine output format
    let output_format = cli
        .output
        .or(config.output_format)
        .unwrap_or(OutputFormat::Pretty);

    // Create context for commands
    let ctx = commands::Context {
        config,
        output_format,
        explain: cli.explain,
        quiet: cli.quiet,
        progress_bar,
    };

    // Dispatch to appropriate command
    match cli.command {
        Commands::Parse(args) => commands::parse::execute(&ctx, args),
        Commands::Verify(args) => commands::verify::execute(&ctx, args).await,
        Commands::Config(args) => commands::config::execute(&ctx, args),
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
fn init_tracing(verbose: bool, quiet: bool, progress_bar: bool, ansi: bool) {
    let directive = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else if progress_bar {
        "warn"
    } else {
        // Per-fingerprint progress lines
        "warn,takeover_verify=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi)
        .init();
}
