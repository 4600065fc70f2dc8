//! Match classification: did a probe observe the fingerprint's signal?

use takeover_core::{ExecOutcome, ProbeOutcome, ProbeSpec, Signal};

/// Resolver messages meaning "this name does not exist".
///
/// Matched as fixed substrings of the executor's error text. glibc, macOS and
/// Windows each word it differently.
pub const RESOLUTION_FAILURES: [&str; 3] = [
    "Name or service not known",
    "nodename nor servname provided",
    "No such host is known",
];

/// Returns true if the error text reports a failed name lookup
#[must_use]
pub fn is_resolution_failure(error: &str) -> bool {
    RESOLUTION_FAILURES.iter().any(|needle| error.contains(needle))
}

/// Classify one executor outcome against the expected signal.
///
/// A status-code signal never looks at the body.
#[must_use]
pub fn classify(signal: &Signal, probe: &ProbeSpec, outcome: &ExecOutcome) -> ProbeOutcome {
    let target = describe(probe);

    match (signal, outcome) {
        (Signal::Nxdomain, ExecOutcome::NetworkError(error)) if is_resolution_failure(error) => {
            ProbeOutcome::matched(format!("NXDOMAIN - {target}"))
        }
        (_, ExecOutcome::NetworkError(error)) => ProbeOutcome::failed(format!("{error} - {target}")),
        (Signal::HttpStatus(expected), ExecOutcome::Response { status_code, .. }) => {
            if status_code == expected {
                ProbeOutcome::matched(format!("Status code {expected} - {target}"))
            } else {
                ProbeOutcome::failed(format!("No match (status {status_code}) - {target}"))
            }
        }
        (Signal::TextPattern(pattern), ExecOutcome::Response { body, .. }) => {
            if pattern.is_match(body) {
                ProbeOutcome::matched(format!("Fingerprint matched - {target}"))
            } else {
                ProbeOutcome::failed(format!("No match - {target}"))
            }
        }
        (Signal::Nxdomain, ExecOutcome::Response { status_code, .. }) => {
            ProbeOutcome::failed(format!("No match (resolved, status {status_code}) - {target}"))
        }
    }
}

/// URL plus the spoofed Host, if any
fn describe(probe: &ProbeSpec) -> String {
    match probe.host_override() {
        Some(host) => format!("{} (Host: {host})", probe.url),
        None => probe.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DNS_FAILURE: &str = "error sending request for url (http://qwertyuiopasdfg.example.com/): \
client error (Connect): dns error: failed to lookup address information: Name or service not known";

    fn probe() -> ProbeSpec {
        ProbeSpec {
            url: "http://qwertyuiopasdfg.example.com".to_string(),
            headers: Vec::new(),
            expect_status_check: false,
        }
    }

    fn response(status_code: u16, body: &str) -> ExecOutcome {
        ExecOutcome::Response {
            status_code,
            body: body.to_string(),
        }
    }

    #[test]
    fn nxdomain_matches_resolution_failures() {
        let outcome = classify(
            &Signal::Nxdomain,
            &probe(),
            &ExecOutcome::NetworkError(DNS_FAILURE.to_string()),
        );
        assert!(outcome.success);
        assert_eq!(outcome.reason, "NXDOMAIN - http://qwertyuiopasdfg.example.com");
    }

    #[test]
    fn nxdomain_rejects_other_network_errors() {
        let outcome = classify(
            &Signal::Nxdomain,
            &probe(),
            &ExecOutcome::NetworkError("operation timed out".to_string()),
        );
        assert!(!outcome.success);
        assert!(outcome.reason.starts_with("operation timed out - "));
    }

    #[test]
    fn nxdomain_rejects_responses() {
        let outcome = classify(&Signal::Nxdomain, &probe(), &response(200, "NXDOMAIN"));
        assert!(!outcome.success);
        assert!(outcome.reason.starts_with("No match"));
    }

    #[test]
    fn http_status_ignores_the_body() {
        let signal = Signal::from_fingerprint("http_status=404");

        let hit = classify(&signal, &probe(), &response(404, "anything at all"));
        assert!(hit.success);
        assert!(hit.reason.starts_with("Status code 404"));

        let body_would_match = Signal::from_fingerprint("http_status=404");
        let miss = classify(&body_would_match, &probe(), &response(200, "http_status=404"));
        assert!(!miss.success);
        assert_eq!(
            miss.reason,
            "No match (status 200) - http://qwertyuiopasdfg.example.com"
        );
    }

    #[test]
    fn text_pattern_searches_the_body() {
        let signal = Signal::from_fingerprint("There is no app configured at that hostname");
        let page = "<html>\n<body>There is no app configured at that hostname</body>\n</html>";

        assert!(classify(&signal, &probe(), &response(404, page)).success);
        let miss = classify(&signal, &probe(), &response(200, "<html>welcome</html>"));
        assert!(!miss.success);
        assert_eq!(miss.reason, "No match - http://qwertyuiopasdfg.example.com");
    }

    #[test]
    fn invalid_regex_degrades_to_substring() {
        let signal = Signal::from_fingerprint("[Error] bucket (not found");
        assert!(classify(&signal, &probe(), &response(404, "x [Error] bucket (not found y")).success);
        assert!(!classify(&signal, &probe(), &response(404, "Error bucket not found")).success);
    }

    #[test]
    fn text_pattern_fails_on_network_errors() {
        let signal = Signal::from_fingerprint("No such app");
        let outcome = classify(&signal, &probe(), &ExecOutcome::NetworkError(DNS_FAILURE.into()));
        assert!(!outcome.success);
        assert!(outcome.reason.contains("Name or service not known"));
    }

    #[test]
    fn reasons_name_the_spoofed_host() {
        let mut spoofed = probe();
        spoofed.url = "https://example.com".to_string();
        spoofed.headers.push(("Host".into(), "abcdefghijklmno.com".into()));

        let outcome = classify(&Signal::HttpStatus(404), &spoofed, &response(404, ""));
        assert_eq!(
            outcome.reason,
            "Status code 404 - https://example.com (Host: abcdefghijklmno.com)"
        );
    }
}
