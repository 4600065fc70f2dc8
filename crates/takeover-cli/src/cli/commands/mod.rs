//! Command implementations.

pub mod config;
pub mod parse;
pub mod verify;

use anyhow::{Context as _, Result};
use std::path::Path;
use takeover_core::readme::{extract_table, read_document};
use takeover_core::table::{parse_table, TableParse};
use takeover_core::{FingerprintRecord, TakeoverError};
use tracing::warn;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration file
    pub config: Config,

    /// Output format
    pub output_format: OutputFormat,

    /// Whether to show educational explanations
    pub explain: bool,

    /// Only print results and errors
    pub quiet: bool,

    /// Draw a progress bar on stderr
    pub progress_bar: bool,
}

/// Read a README, naming the path on failure.
pub fn load_document(readme: &Path) -> Result<String> {
    read_document(readme).with_context(|| format!("reading {}", readme.display()))
}

/// Parse the fingerprint table of a document.
///
/// Malformed rows are logged and left out. A missing document or table is an
/// error.
pub fn parse_records(document: &str) -> Result<Vec<FingerprintRecord>> {
    Ok(parse_document(document)?.records)
}

/// Parse the fingerprint table, keeping the malformed rows alongside.
pub fn parse_document(document: &str) -> Result<TableParse> {
    let rows = match extract_table(document) {
        Ok(rows) => rows,
        Err(e) if e.is_missing_input() => {
            return Err(anyhow::Error::new(e).context("nothing to verify"));
        }
        Err(e) => return Err(e.into()),
    };
    let parsed = parse_table(rows.iter().copied());

    for error in &parsed.errors {
        let error = TakeoverError::from(error.clone());
        warn!(%error, "skipping row");
    }

    Ok(parsed)
}
