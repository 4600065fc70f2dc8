//! Locating the fingerprint table inside a README.
//!
//! The table is the first block of `|`-prefixed lines following the marker
//! line `<!--FINGERPRINTS-->`. Blank lines between the marker and the table
//! are allowed.

use std::path::Path;

use crate::error::{Result, TakeoverError};

/// Marker line preceding the fingerprint table
pub const MARKER: &str = "<!--FINGERPRINTS-->";

/// Line span of the table: `start..end` over `str::lines()`
fn table_span(lines: &[&str]) -> Result<(usize, usize)> {
    let marker = lines
        .iter()
        .position(|line| line.trim() == MARKER)
        .ok_or_else(|| TakeoverError::MissingTable(format!("marker `{MARKER}` not present")))?;

    let start = lines[marker + 1..]
        .iter()
        .position(|line| !line.trim().is_empty())
        .map_or(lines.len(), |offset| marker + 1 + offset);

    let end = lines[start..]
        .iter()
        .position(|line| !line.trim_start().starts_with('|'))
        .map_or(lines.len(), |offset| start + offset);

    if start == end {
        return Err(TakeoverError::MissingTable(format!(
            "no table rows after `{MARKER}`"
        )));
    }
    Ok((start, end))
}

/// Table rows of a README document
pub fn extract_table(document: &str) -> Result<Vec<&str>> {
    if document.trim().is_empty() {
        return Err(TakeoverError::EmptyDocument);
    }
    let lines: Vec<&str> = document.lines().collect();
    let (start, end) = table_span(&lines)?;
    Ok(lines[start..end].to_vec())
}

/// Replace the table of a README document with `table`
pub fn splice_table(document: &str, table: &str) -> Result<String> {
    if document.trim().is_empty() {
        return Err(TakeoverError::EmptyDocument);
    }
    let lines: Vec<&str> = document.lines().collect();
    let (start, end) = table_span(&lines)?;

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    out.extend_from_slice(&lines[..start]);
    out.extend(table.lines());
    out.extend_from_slice(&lines[end..]);

    let mut spliced = out.join("\n");
    if document.ends_with('\n') {
        spliced.push('\n');
    }
    Ok(spliced)
}

/// Read a README from disk
pub fn read_document(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}
