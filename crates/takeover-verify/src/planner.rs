//! Probe planning: the requests that can confirm a fingerprint.
//!
//! For every domain and for both `http` and `https`, two probes are planned:
//!
//! 1. a random subdomain, `scheme://<random>.<domain>`, which lands on the
//!    provider's "nothing configured here" page (or fails to resolve);
//! 2. the domain itself with a random `Host` header, `Host: <random>.com`,
//!    which hits the same page on providers that route by Host.
//!
//! The plan is lazy: random names are only drawn when a probe is needed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use takeover_client::browser_headers;
use takeover_core::{FingerprintRecord, ProbeSpec};

/// Length of the random labels used for subdomains and Host headers
pub const RANDOM_LABEL_LEN: usize = 15;

const SCHEMES: [&str; 2] = ["http", "https"];

/// Probes planned per domain: two schemes, two probe kinds
pub const PROBES_PER_DOMAIN: usize = SCHEMES.len() * 2;

/// Random lowercase label
pub fn random_label<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..RANDOM_LABEL_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Strip `*.` and leading-dot wildcard prefixes
#[must_use]
pub fn strip_wildcard(domain: &str) -> &str {
    domain.trim_start_matches("*.").trim_start_matches('.')
}

/// Lazy sequence of probes for one record
#[derive(Debug)]
pub struct ProbePlan<R = StdRng> {
    domains: Vec<String>,
    expect_status_check: bool,
    rng: R,
    next: usize,
}

impl ProbePlan<StdRng> {
    /// Plan probes for a record using an entropy-seeded generator
    #[must_use]
    pub fn new(record: &FingerprintRecord) -> Self {
        Self::with_rng(record, StdRng::from_entropy())
    }
}

impl<R: Rng> ProbePlan<R> {
    /// Plan probes for a record using the given generator
    pub fn with_rng(record: &FingerprintRecord, rng: R) -> Self {
        let domains = record
            .domains
            .iter()
            .map(|d| strip_wildcard(d))
            .filter(|d| !d.is_empty())
            .map(ToString::to_string)
            .collect();

        Self {
            domains,
            expect_status_check: record.signal.http_status().is_some(),
            rng,
            next: 0,
        }
    }

    /// Total number of probes in the plan
    #[must_use]
    pub fn len_hint(&self) -> usize {
        self.domains.len() * PROBES_PER_DOMAIN
    }

    fn remaining(&self) -> usize {
        self.len_hint().saturating_sub(self.next)
    }
}

impl<R: Rng> Iterator for ProbePlan<R> {
    type Item = ProbeSpec;

    fn next(&mut self) -> Option<ProbeSpec> {
        let index = self.next;
        let domain = self.domains.get(index / PROBES_PER_DOMAIN)?;
        self.next += 1;

        let scheme = SCHEMES[(index / 2) % SCHEMES.len()];
        let label = random_label(&mut self.rng);
        let mut headers = browser_headers();

        let url = if index % 2 == 0 {
            format!("{scheme}://{label}.{domain}")
        } else {
            headers.push(("Host".to_string(), format!("{label}.com")));
            format!("{scheme}://{domain}")
        };

        Some(ProbeSpec {
            url,
            headers,
            expect_status_check: self.expect_status_check,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for ProbePlan<R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use takeover_core::Status;

    fn record(domains: &[&str], fingerprint: &str) -> FingerprintRecord {
        FingerprintRecord::new(
            "Engine",
            Status::Vulnerable,
            domains.iter().map(ToString::to_string).collect(),
            fingerprint,
            "",
            "",
        )
    }

    fn seeded(record: &FingerprintRecord) -> ProbePlan {
        ProbePlan::with_rng(record, StdRng::seed_from_u64(7))
    }

    fn label_of(host: &str, suffix: &str) -> String {
        host.strip_suffix(suffix).unwrap().to_string()
    }

    #[test]
    fn four_probes_per_domain_in_order() {
        let probes: Vec<ProbeSpec> = seeded(&record(&["herokuapp.com"], "No such app")).collect();
        assert_eq!(probes.len(), 4);

        let random_sub = label_of(probes[0].url.strip_prefix("http://").unwrap(), ".herokuapp.com");
        assert_eq!(random_sub.len(), RANDOM_LABEL_LEN);
        assert!(random_sub.bytes().all(|b| b.is_ascii_lowercase()));
        assert_eq!(probes[0].host_override(), None);

        assert_eq!(probes[1].url, "http://herokuapp.com");
        let spoofed = label_of(probes[1].host_override().unwrap(), ".com");
        assert_eq!(spoofed.len(), RANDOM_LABEL_LEN);

        assert!(probes[2].url.starts_with("https://"));
        assert!(probes[2].url.ends_with(".herokuapp.com"));
        assert_eq!(probes[3].url, "https://herokuapp.com");
        assert!(probes[3].host_override().is_some());

        assert!(probes.iter().all(|p| !p.expect_status_check));
        assert!(probes
            .iter()
            .all(|p| p.headers.iter().any(|(name, _)| name == "User-Agent")));
    }

    #[test]
    fn wildcards_are_stripped_and_empty_domains_dropped() {
        let plan = seeded(&record(&["*.cloudapp.net", ".trafficmanager.net", "*."], "NXDOMAIN"));
        assert_eq!(plan.len_hint(), 8);

        let probes: Vec<ProbeSpec> = plan.collect();
        assert_eq!(probes[1].url, "http://cloudapp.net");
        assert_eq!(probes[5].url, "http://trafficmanager.net");
    }

    #[test]
    fn status_fingerprints_disable_redirects_everywhere() {
        let probes: Vec<ProbeSpec> = seeded(&record(&["a.com", "b.com"], "http_status=404")).collect();
        assert_eq!(probes.len(), 8);
        assert!(probes.iter().all(|p| p.expect_status_check));
    }

    #[test]
    fn plan_is_lazy_and_exact_sized() {
        let mut plan = seeded(&record(&["a.com", "b.com"], "x"));
        assert_eq!(plan.len(), 8);
        plan.next();
        plan.next();
        assert_eq!(plan.len(), 6);
        assert_eq!(plan.by_ref().count(), 6);
        assert!(plan.next().is_none());
    }

    #[test]
    fn random_labels_differ() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = random_label(&mut rng);
        let b = random_label(&mut rng);
        assert_ne!(a, b);
    }
}
