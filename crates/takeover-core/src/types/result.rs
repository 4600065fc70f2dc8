//! Verification results and the records rendered from them.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{FingerprintRecord, Ineligibility, Status};

/// Separator between aggregated failure reasons
const REASON_SEPARATOR: &str = "; ";

/// Reason recorded when the run deadline fires before a record finishes
pub const DEADLINE_REASON: &str = "Run deadline exceeded";

/// Outcome of verifying one fingerprint record
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    /// The record that was verified
    pub record: FingerprintRecord,
    /// True if some probe observed the signal
    pub verified: bool,
    /// Winning reason, or every failure reason joined
    pub reason: String,
    /// Individual failure reasons, in plan order (empty unless exhausted)
    pub failures: Vec<String>,
    /// Number of probes executed
    pub probes: usize,
}

impl VerificationResult {
    /// Record skipped before probing
    #[must_use]
    pub fn ineligible(record: FingerprintRecord, why: Ineligibility) -> Self {
        Self {
            record,
            verified: false,
            reason: why.reason().to_string(),
            failures: Vec::new(),
            probes: 0,
        }
    }

    /// Record confirmed by a probe
    #[must_use]
    pub fn verified(record: FingerprintRecord, reason: impl Into<String>, probes: usize) -> Self {
        Self {
            record,
            verified: true,
            reason: reason.into(),
            failures: Vec::new(),
            probes,
        }
    }

    /// Every probe failed
    #[must_use]
    pub fn exhausted(record: FingerprintRecord, failures: Vec<String>) -> Self {
        let reason = if failures.is_empty() {
            String::from("No probes")
        } else {
            failures.join(REASON_SEPARATOR)
        };
        Self {
            probes: failures.len(),
            record,
            verified: false,
            reason,
            failures,
        }
    }

    /// The whole-run deadline fired first
    #[must_use]
    pub fn deadline_exceeded(record: FingerprintRecord) -> Self {
        Self {
            record,
            verified: false,
            reason: DEADLINE_REASON.to_string(),
            failures: Vec::new(),
            probes: 0,
        }
    }

    /// Reason shortened to at most `limit` failure entries.
    ///
    /// Omitted entries are counted, never dropped silently.
    #[must_use]
    pub fn reason_summary(&self, limit: usize) -> String {
        if self.failures.len() <= limit {
            return self.reason.clone();
        }
        let shown = self.failures[..limit].join(REASON_SEPARATOR);
        let omitted = self.failures.len() - limit;
        if shown.is_empty() {
            format!("(+{omitted} more)")
        } else {
            format!("{shown} (+{omitted} more)")
        }
    }
}

/// Sort results by engine name
pub fn sort_results(results: &mut [VerificationResult]) {
    results.sort_by(|a, b| a.record.engine.cmp(&b.record.engine));
}

/// Structured output row, one per fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    /// Engine name
    pub service: String,
    /// Candidate domains
    pub cname: Vec<String>,
    /// Raw fingerprint
    pub fingerprint: String,
    /// Fingerprint is the NXDOMAIN condition
    pub nxdomain: bool,
    /// Expected status code, for status-code fingerprints
    pub http_status: Option<u16>,
    /// Status label
    pub status: Status,
    /// Status is vulnerable
    pub vulnerable: bool,
    /// Fingerprint was verified on this run
    pub cicd_pass: bool,
    /// Discussion link(s)
    pub discussion: String,
    /// Documentation link(s)
    pub documentation: String,
}

impl From<&VerificationResult> for ServiceRecord {
    fn from(result: &VerificationResult) -> Self {
        let record = &result.record;
        Self {
            service: record.engine.clone(),
            cname: record.domains.clone(),
            fingerprint: record.fingerprint.clone(),
            nxdomain: record.signal.is_nxdomain(),
            http_status: record.signal.http_status(),
            status: record.status.clone(),
            vulnerable: record.status.is_vulnerable(),
            cicd_pass: result.verified,
            discussion: record.discussion.clone(),
            documentation: record.documentation.clone(),
        }
    }
}

/// Build the structured record list, sorted by service
#[must_use]
pub fn service_records(results: &[VerificationResult]) -> Vec<ServiceRecord> {
    let mut records: Vec<ServiceRecord> = results.iter().map(ServiceRecord::from).collect();
    records.sort_by(|a, b| a.service.cmp(&b.service));
    records
}

/// Parse-only export entry, keyed by engine in a [`Registry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Status label
    pub status: Status,
    /// Candidate domains
    pub domains: Vec<String>,
    /// Raw fingerprint
    pub fingerprint: String,
    /// Discussion link(s)
    pub discussion: String,
    /// Documentation link(s)
    pub documentation: String,
}

impl From<&FingerprintRecord> for RegistryEntry {
    fn from(record: &FingerprintRecord) -> Self {
        Self {
            status: record.status.clone(),
            domains: record.domains.clone(),
            fingerprint: record.fingerprint.clone(),
            discussion: record.discussion.clone(),
            documentation: record.documentation.clone(),
        }
    }
}

/// Fingerprints keyed by engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    /// Entries, sorted by engine
    pub entries: BTreeMap<String, RegistryEntry>,
    /// Engines that appeared more than once (last row won)
    pub duplicates: Vec<String>,
}

impl Registry {
    /// Build the map. Duplicate engines are last-write-wins.
    #[must_use]
    pub fn build(records: &[FingerprintRecord]) -> Self {
        let mut registry = Self::default();
        for record in records {
            let previous = registry
                .entries
                .insert(record.engine.clone(), RegistryEntry::from(record));
            if previous.is_some() {
                registry.duplicates.push(record.engine.clone());
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(engine: &str, fingerprint: &str) -> FingerprintRecord {
        FingerprintRecord::new(
            engine,
            Status::Vulnerable,
            vec!["example.com".into()],
            fingerprint,
            "[Issue #1](https://example.com/1)",
            "",
        )
    }

    #[test]
    fn exhausted_joins_every_reason() {
        let failures = vec!["No match - http://a".to_string(), "timed out - https://a".to_string()];
        let result = VerificationResult::exhausted(record("A", "x"), failures);
        assert!(!result.verified);
        assert_eq!(result.probes, 2);
        assert_eq!(result.reason, "No match - http://a; timed out - https://a");
    }

    #[test]
    fn reason_summary_counts_omitted() {
        let failures: Vec<String> = (1..=5).map(|i| format!("r{i}")).collect();
        let result = VerificationResult::exhausted(record("A", "x"), failures);
        assert_eq!(result.reason_summary(2), "r1; r2 (+3 more)");
        assert_eq!(result.reason_summary(5), result.reason);
        assert_eq!(result.reason_summary(0), "(+5 more)");
    }

    #[test]
    fn service_record_fields() {
        let nx = VerificationResult::verified(record("Nx", "NXDOMAIN"), "NXDOMAIN - http://x", 1);
        let status = VerificationResult::exhausted(record("St", "http_status=404"), vec!["No match".into()]);
        let rows = service_records(&[status, nx]);

        assert_eq!(rows[0].service, "Nx");
        assert!(rows[0].nxdomain);
        assert!(rows[0].cicd_pass);
        assert_eq!(rows[0].http_status, None);

        assert_eq!(rows[1].service, "St");
        assert!(!rows[1].nxdomain);
        assert!(!rows[1].cicd_pass);
        assert_eq!(rows[1].http_status, Some(404));
        assert!(rows[1].vulnerable);
    }

    #[test]
    fn service_record_json_shape() {
        let result = VerificationResult::verified(record("Heroku", "No such app"), "ok", 1);
        let json = serde_json::to_value(ServiceRecord::from(&result)).unwrap();
        assert_eq!(json["service"], "Heroku");
        assert_eq!(json["cname"][0], "example.com");
        assert_eq!(json["status"], "Vulnerable");
        assert_eq!(json["http_status"], serde_json::Value::Null);
        assert_eq!(json["cicd_pass"], true);
    }

    #[test]
    fn registry_is_last_write_wins() {
        let records = vec![record("B", "first"), record("A", "a"), record("B", "second")];
        let registry = Registry::build(&records);

        assert_eq!(registry.entries.len(), 2);
        assert_eq!(registry.entries["B"].fingerprint, "second");
        assert_eq!(registry.duplicates, vec!["B".to_string()]);
        let keys: Vec<&str> = registry.entries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["A", "B"]);
    }
}
