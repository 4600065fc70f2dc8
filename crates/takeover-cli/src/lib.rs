//! # takeover-cli
//!
//! Command-line front end for verifying subdomain-takeover fingerprints.
//!
//! ## Features
//!
//! - **Parse**: export the README fingerprint table as JSON keyed by engine
//! - **Verify**: probe every vulnerable fingerprint and report which still hold
//! - **Write-back**: regenerate the README table with fresh CI/CD verdicts
//! - **Educational mode**: `--explain` describes what a command is about to do
//! - **Multiple output formats**: Pretty tables, JSON, YAML, Markdown

pub mod cli;
pub mod config;
pub mod education;
pub mod output;

pub use cli::run;
