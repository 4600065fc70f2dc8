//! Probe client configuration.

use std::time::Duration;

/// Browser User-Agent sent with every probe
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default cap on how much of a response body is read
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Default redirect limit for probes that follow redirects
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Headers a regular browser would send
#[must_use]
pub fn browser_headers() -> Vec<(String, String)> {
    [
        ("User-Agent", BROWSER_USER_AGENT),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "en-US,en;q=0.5"),
        ("Connection", "close"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Settings for the HTTP clients behind a probe client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// Default User-Agent (probes may override it)
    pub user_agent: String,

    /// Maximum number of body bytes read per response
    pub max_body_bytes: usize,

    /// Redirect limit when following redirects
    pub max_redirects: usize,

    /// Skip TLS certificate validation
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: BROWSER_USER_AGENT.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            // Unclaimed resources routinely serve expired or mismatched certs
            accept_invalid_certs: true,
        }
    }
}

impl ClientConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the body size cap
    #[must_use]
    pub const fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Set the redirect limit
    #[must_use]
    pub const fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Enable or disable TLS certificate validation
    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set the default User-Agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert!(config.accept_invalid_certs);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn setters_chain() {
        let config = ClientConfig::new()
            .timeout(Duration::from_secs(30))
            .max_body_bytes(1024)
            .accept_invalid_certs(false)
            .user_agent("probe/1.0");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_bytes, 1024);
        assert!(!config.accept_invalid_certs);
        assert_eq!(config.user_agent, "probe/1.0");
    }

    #[test]
    fn browser_headers_carry_a_user_agent() {
        let headers = browser_headers();
        assert!(headers
            .iter()
            .any(|(name, value)| name == "User-Agent" && value.starts_with("Mozilla/5.0")));
    }
}
