//! Output formatting for different formats.

use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tabled::settings::object::Columns;
use tabled::settings::{Modify, Style, Width};
use tabled::{Table, Tabled};
use takeover_core::table::{UNVERIFIED_GLYPH, VERIFIED_GLYPH};
use takeover_core::VerificationResult;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed tables with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Markdown fingerprint table, as written back to the README
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "table" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "markdown" | "md" => Ok(Self::Markdown),
            _ => anyhow::bail!(
                "Unknown output format: {s}\n\
                 Valid formats: pretty, json, yaml, markdown"
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
            Self::Markdown => write!(f, "markdown"),
        }
    }
}

/// Widest reason cell in the pretty table
const REASON_WIDTH: usize = 80;

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "Engine")]
    engine: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CI/CD")]
    verified: &'static str,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// Terminal table of results, one row per fingerprint
pub fn pretty_table(results: &[VerificationResult], reason_limit: usize) -> String {
    let rows: Vec<ResultRow> = results
        .iter()
        .map(|r| ResultRow {
            engine: r.record.engine.clone(),
            status: r.record.status.to_string(),
            verified: if r.verified {
                VERIFIED_GLYPH
            } else {
                UNVERIFIED_GLYPH
            },
            reason: r.reason_summary(reason_limit),
        })
        .collect();

    Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(3)).with(Width::wrap(REASON_WIDTH).keep_words(true)))
        .to_string()
}

/// One-line colored summary
pub fn summary(verified: usize, total: usize, elapsed: Duration) -> String {
    let counts = format!("{verified}/{total} fingerprints verified");
    let counts = if verified == total {
        counts.green().bold()
    } else {
        counts.yellow().bold()
    };
    format!("{counts} {}", format!("in {:.1}s", elapsed.as_secs_f64()).dimmed())
}

/// Progress line for one finished fingerprint: glyph, engine, reason
pub fn progress_line(result: &VerificationResult, reason_limit: usize) -> String {
    let glyph = if result.verified {
        VERIFIED_GLYPH
    } else {
        UNVERIFIED_GLYPH
    };
    format!(
        "{glyph} {} {}",
        result.record.engine.bold(),
        result.reason_summary(reason_limit).dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use takeover_core::{FingerprintRecord, Status};

    #[test]
    fn parses_format_names() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert!("csv".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for format in [
            OutputFormat::Pretty,
            OutputFormat::Json,
            OutputFormat::Yaml,
            OutputFormat::Markdown,
        ] {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
    }

    #[test]
    fn pretty_table_lists_every_result() {
        let record = FingerprintRecord::new(
            "Heroku",
            Status::Vulnerable,
            vec!["herokuapp.com".to_string()],
            "No such app",
            "",
            "",
        );
        let results = vec![
            VerificationResult::verified(record.clone(), "Fingerprint matched - http://x.herokuapp.com", 1),
            VerificationResult::exhausted(record, vec!["No match - http://herokuapp.com".to_string()]),
        ];

        let table = pretty_table(&results, 4);
        assert_eq!(table.matches("Heroku").count(), 2);
        assert!(table.contains(VERIFIED_GLYPH));
        assert!(table.contains(UNVERIFIED_GLYPH));
    }

    #[test]
    fn progress_line_carries_engine_and_reason() {
        colored::control::set_override(false);
        let record = FingerprintRecord::new(
            "Surge.sh",
            Status::Vulnerable,
            vec!["surge.sh".to_string()],
            "project not found",
            "",
            "",
        );
        let failures = (0..6).map(|i| format!("No match - http://f{i}.surge.sh")).collect();
        let line = progress_line(&VerificationResult::exhausted(record, failures), 2);

        assert!(line.starts_with(UNVERIFIED_GLYPH));
        assert!(line.contains("Surge.sh"));
        assert!(line.contains("No match - http://f0.surge.sh"));
        assert!(line.ends_with("(+4 more)"));
    }

    #[test]
    fn summary_reports_seconds() {
        colored::control::set_override(false);
        let line = summary(3, 4, Duration::from_millis(2_500));
        assert_eq!(line, "3/4 fingerprints verified in 2.5s");
    }
}
