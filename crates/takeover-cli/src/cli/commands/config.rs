//! `takeover config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::{Config, DEFAULT_README};
use crate::education::Explain;
use crate::output::OutputFormat;

pub fn execute(ctx: &Context, args: ConfigArgs) -> Result<()> {
    if ctx.explain {
        Explain::config().print();
    }

    match args.command {
        ConfigCommands::Show => show_config(ctx),
        ConfigCommands::Set { key, value } => set_config(&key, &value),
        ConfigCommands::Path => show_path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Pretty | OutputFormat::Markdown => {
            println!("{}", "Current Configuration:".bold());
            println!();

            let unset = || "(default)".dimmed().to_string();
            let readme = config.readme.as_ref().map_or_else(
                || format!("{DEFAULT_README} {}", unset()),
                |p| p.display().to_string(),
            );
            println!("  {} {}", "readme:".bold(), readme);
            println!(
                "  {} {}",
                "workers:".bold(),
                config.workers.map_or_else(unset, |w| w.to_string())
            );
            println!(
                "  {} {}",
                "timeout_secs:".bold(),
                config.timeout_secs.map_or_else(unset, |t| t.to_string())
            );
            println!(
                "  {} {}",
                "deadline_secs:".bold(),
                config.deadline_secs.map_or_else(unset, |d| d.to_string())
            );
            println!(
                "  {} {}",
                "output_format:".bold(),
                config.output_format.unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;

    println!("{} {} set to {}.", "Success:".green().bold(), key, value.cyan());
    Ok(())
}

fn show_path() -> Result<()> {
    let path = Config::path()?;
    println!("{}", path.display());
    Ok(())
}
