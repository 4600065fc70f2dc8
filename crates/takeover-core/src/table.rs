//! Markdown fingerprint table: row parser and renderer.
//!
//! Columns, in order:
//!
//! ```text
//! | Engine | Status | Verified by CI/CD | Domains | Fingerprint | Discussion | Documentation |
//! ```
//!
//! The CI/CD column is output only; it is ignored when parsing.

use crate::error::TakeoverError;
use crate::types::{FingerprintRecord, Status, VerificationResult};

/// Number of columns in a data row
pub const COLUMNS: usize = 7;

/// Label of the first header cell
pub const HEADER_LABEL: &str = "Engine";

/// Glyph for a fingerprint verified on this run
pub const VERIFIED_GLYPH: &str = "✅";

/// Glyph for a fingerprint that was not verified
pub const UNVERIFIED_GLYPH: &str = "❌";

const HEADER: [&str; COLUMNS] = [
    HEADER_LABEL,
    "Status",
    "Verified by CI/CD",
    "Domains",
    "Fingerprint",
    "Discussion",
    "Documentation",
];

/// Result of parsing one table row
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Header, separator or empty row
    Skip,
    /// A data row
    Record(FingerprintRecord),
    /// The row could not be destructured into the expected columns
    StructuralError(String),
}

/// A malformed row, reported without aborting the parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number within the table
    pub line: usize,
    /// What was wrong
    pub message: String,
}

impl From<RowError> for TakeoverError {
    fn from(err: RowError) -> Self {
        Self::MalformedRow {
            line: err.line,
            message: err.message,
        }
    }
}

/// All records of a table plus the rows that failed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableParse {
    /// Parsed records, in table order
    pub records: Vec<FingerprintRecord>,
    /// Malformed rows
    pub errors: Vec<RowError>,
}

/// Parse one row of the table
#[must_use]
pub fn parse_row(row: &str) -> ParseOutcome {
    let mut cols = split_cells(row);

    let Some(first) = cols.first() else {
        return ParseOutcome::Skip;
    };
    if first.is_empty() || *first == HEADER_LABEL || first.chars().all(|c| c == '-') {
        return ParseOutcome::Skip;
    }

    if cols.len() > COLUMNS {
        return ParseOutcome::StructuralError(format!(
            "expected {COLUMNS} columns, found {}",
            cols.len()
        ));
    }
    cols.resize(COLUMNS, "");

    let [engine, status, _cicd, domains, fingerprint, discussion, documentation] = cols[..] else {
        return ParseOutcome::StructuralError(format!("expected {COLUMNS} columns"));
    };

    ParseOutcome::Record(FingerprintRecord::new(
        engine,
        Status::parse(status),
        split_domains(domains),
        fingerprint,
        discussion,
        documentation,
    ))
}

/// Parse every row, keeping going past malformed ones
pub fn parse_table<'a>(rows: impl IntoIterator<Item = &'a str>) -> TableParse {
    let mut parsed = TableParse::default();
    for (index, row) in rows.into_iter().enumerate() {
        match parse_row(row) {
            ParseOutcome::Skip => {}
            ParseOutcome::Record(record) => parsed.records.push(record),
            ParseOutcome::StructuralError(message) => parsed.errors.push(RowError {
                line: index + 1,
                message,
            }),
        }
    }
    parsed
}

/// Cells between the outer pipes, trimmed of whitespace and backticks
fn split_cells(row: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = row
        .split('|')
        .map(|c| c.trim_matches(|ch: char| ch.is_whitespace() || ch == '`'))
        .collect();

    // Fragments before the first and after the last pipe are not cells
    if cells.len() < 2 {
        return Vec::new();
    }
    cells.pop();
    cells.remove(0);
    cells
}

/// Split a domain cell on commas and/or whitespace
fn split_domains(cell: &str) -> Vec<String> {
    cell.split(|c: char| c == ',' || c.is_whitespace())
        .map(|d| d.trim_matches('`'))
        .filter(|d| !d.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Render results as the Markdown table, sorted by engine
#[must_use]
pub fn render_table(results: &[VerificationResult]) -> String {
    let mut sorted: Vec<&VerificationResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.record.engine.cmp(&b.record.engine));

    let mut out = String::new();
    push_row(&mut out, HEADER.iter().map(|h| (*h).to_string()));
    push_row(&mut out, HEADER.iter().map(|_| "---".to_string()));

    for result in sorted {
        let record = &result.record;
        let glyph = if result.verified {
            VERIFIED_GLYPH
        } else {
            UNVERIFIED_GLYPH
        };
        let fingerprint = if record.fingerprint.is_empty() {
            String::new()
        } else {
            format!("`{}`", record.fingerprint)
        };
        push_row(
            &mut out,
            [
                record.engine.clone(),
                record.status.label().to_string(),
                glyph.to_string(),
                record.domains.join(", "),
                fingerprint,
                record.discussion.clone(),
                record.documentation.clone(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, cells: impl IntoIterator<Item = String>) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&cell);
        out.push_str(" |");
    }
    out.push('\n');
}
