//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;

/// Overrides the config file location.
pub const CONFIG_ENV: &str = "TAKEOVER_CONFIG";

/// README read when nothing else names one.
pub const DEFAULT_README: &str = "README.md";

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// README containing the fingerprint table.
    pub readme: Option<PathBuf>,

    /// Fingerprints verified at the same time.
    pub workers: Option<usize>,

    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Whole-run deadline in seconds.
    pub deadline_secs: Option<u64>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

impl Config {
    /// Get the config file path.
    pub fn path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("xyz", "can-i-take-over", "takeover")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load configuration from a file. A missing file is the default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Save configuration to a file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config {}", path.display()))?;

        Ok(())
    }

    /// Set one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "readme" => self.readme = Some(PathBuf::from(value)),
            "workers" => self.workers = Some(value.parse().context("workers must be a number")?),
            "timeout_secs" | "timeout" => {
                self.timeout_secs = Some(value.parse().context("timeout_secs must be a number")?);
            }
            "deadline_secs" | "deadline" => {
                self.deadline_secs = Some(value.parse().context("deadline_secs must be a number")?);
            }
            "output_format" | "output" => self.output_format = Some(value.parse()?),
            _ => anyhow::bail!(
                "Unknown config key: {key}\n\n\
                 Available keys:\n  \
                 readme         - README containing the fingerprint table\n  \
                 workers        - Fingerprints verified at the same time\n  \
                 timeout_secs   - Per-request timeout in seconds\n  \
                 deadline_secs  - Whole-run deadline in seconds\n  \
                 output_format  - Default output format (pretty/json/yaml/markdown)"
            ),
        }
        Ok(())
    }

    /// README to read: flag or env first, then the config file, then `README.md`.
    pub fn readme_or(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.readme.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_README))
    }
}
