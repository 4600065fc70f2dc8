//! Fingerprint records parsed from the registry table.

use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::fmt;

/// Prefix of a status-code fingerprint, e.g. `http_status=404`
const HTTP_STATUS_PREFIX: &str = "http_status=";

/// Literal fingerprint meaning "the name does not resolve"
const NXDOMAIN: &str = "NXDOMAIN";

/// Whether an unclaimed resource of an engine can be taken over
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// Takeover is possible
    Vulnerable,
    /// Takeover is not possible
    NotVulnerable,
    /// Anything else the table says ("Edge case", ...), label preserved
    Unknown(String),
}

impl Status {
    /// Parse the status cell of a table row
    #[must_use]
    pub fn parse(label: &str) -> Self {
        if label.eq_ignore_ascii_case("Vulnerable") {
            Self::Vulnerable
        } else if label.eq_ignore_ascii_case("Not vulnerable") {
            Self::NotVulnerable
        } else {
            Self::Unknown(label.to_string())
        }
    }

    /// Label as written in the table
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Vulnerable => "Vulnerable",
            Self::NotVulnerable => "Not vulnerable",
            Self::Unknown(label) => label,
        }
    }

    /// Returns true for [`Status::Vulnerable`]
    #[must_use]
    pub const fn is_vulnerable(&self) -> bool {
        matches!(self, Self::Vulnerable)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Body matcher for free-text fingerprints.
///
/// Fingerprints are written by hand in a Markdown table, so plenty of them are
/// not valid regex syntax. Those fall back to a plain substring search.
#[derive(Debug, Clone)]
pub enum TextPattern {
    /// Multi-line, unanchored regular expression
    Regex(Regex),
    /// Literal substring, used when the fingerprint does not compile
    Literal(String),
}

impl TextPattern {
    /// Compile a fingerprint, never failing
    #[must_use]
    pub fn compile(raw: &str) -> Self {
        RegexBuilder::new(raw)
            .multi_line(true)
            .build()
            .map_or_else(|_| Self::Literal(raw.to_string()), Self::Regex)
    }

    /// Search the body for the pattern
    #[must_use]
    pub fn is_match(&self, body: &str) -> bool {
        match self {
            Self::Regex(re) => re.is_match(body),
            Self::Literal(needle) => body.contains(needle.as_str()),
        }
    }

    /// Source text of the pattern
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Regex(re) => re.as_str(),
            Self::Literal(needle) => needle,
        }
    }

    /// Returns true if the fingerprint did not compile as a regex
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

impl PartialEq for TextPattern {
    fn eq(&self, other: &Self) -> bool {
        self.is_literal() == other.is_literal() && self.as_str() == other.as_str()
    }
}

/// What a probe has to observe for a fingerprint to count as confirmed
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Response body matches the pattern
    TextPattern(TextPattern),
    /// The probed name fails to resolve
    Nxdomain,
    /// Direct (non-redirected) response has this status code
    HttpStatus(u16),
}

impl Signal {
    /// Derive the signal from a raw fingerprint cell
    #[must_use]
    pub fn from_fingerprint(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case(NXDOMAIN) {
            return Self::Nxdomain;
        }

        if let Some(code) = parse_http_status(raw) {
            return Self::HttpStatus(code);
        }

        Self::TextPattern(TextPattern::compile(raw))
    }

    /// Expected status code, if this is a status-code signal
    #[must_use]
    pub const fn http_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns true for [`Signal::Nxdomain`]
    #[must_use]
    pub const fn is_nxdomain(&self) -> bool {
        matches!(self, Self::Nxdomain)
    }
}

/// Match `^http_status=\d{3}$`
fn parse_http_status(raw: &str) -> Option<u16> {
    let digits = raw.strip_prefix(HTTP_STATUS_PREFIX)?;
    if digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

/// Why a record is skipped before any probe is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Status is anything other than vulnerable
    NotVulnerable,
    /// No domain to probe
    MissingDomain,
    /// Empty fingerprint cell
    MissingFingerprint,
}

impl Ineligibility {
    /// Human-readable reason
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::NotVulnerable => "Not vulnerable.",
            Self::MissingDomain => "Missing domain.",
            Self::MissingFingerprint => "Missing fingerprint.",
        }
    }
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// One engine's row of the fingerprint table
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintRecord {
    /// Engine display name, unique key
    pub engine: String,
    /// Takeover status
    pub status: Status,
    /// Candidate parent domains, in table order
    pub domains: Vec<String>,
    /// Raw fingerprint cell
    pub fingerprint: String,
    /// Signal derived from `fingerprint`
    pub signal: Signal,
    /// Discussion link(s)
    pub discussion: String,
    /// Documentation link(s)
    pub documentation: String,
}

impl FingerprintRecord {
    /// Build a record, deriving the signal from the fingerprint
    #[must_use]
    pub fn new(
        engine: impl Into<String>,
        status: Status,
        domains: Vec<String>,
        fingerprint: impl Into<String>,
        discussion: impl Into<String>,
        documentation: impl Into<String>,
    ) -> Self {
        let fingerprint = fingerprint.into();
        let signal = Signal::from_fingerprint(&fingerprint);
        Self {
            engine: engine.into(),
            status,
            domains,
            fingerprint,
            signal,
            discussion: discussion.into(),
            documentation: documentation.into(),
        }
    }

    /// Check whether the record can be verified at all.
    ///
    /// Checks run in order: status, domains, fingerprint.
    pub fn eligibility(&self) -> std::result::Result<(), Ineligibility> {
        if !self.status.is_vulnerable() {
            return Err(Ineligibility::NotVulnerable);
        }
        if self.domains.is_empty() {
            return Err(Ineligibility::MissingDomain);
        }
        if self.fingerprint.is_empty() {
            return Err(Ineligibility::MissingFingerprint);
        }
        Ok(())
    }
}
