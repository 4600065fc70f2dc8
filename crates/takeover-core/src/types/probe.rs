//! Probe specifications and their outcomes.

/// A single HTTP request to send while verifying a fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSpec {
    /// Absolute URL to request
    pub url: String,
    /// Request headers, in order
    pub headers: Vec<(String, String)>,
    /// Read the status of the direct response (redirects are not followed)
    pub expect_status_check: bool,
}

impl ProbeSpec {
    /// Value of the `Host` header, if the probe overrides it
    #[must_use]
    pub fn host_override(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("host"))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if redirects should be followed for this probe
    #[must_use]
    pub const fn follows_redirects(&self) -> bool {
        !self.expect_status_check
    }
}

/// What the executor observed for one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// A response arrived
    Response {
        /// HTTP status code
        status_code: u16,
        /// Body decoded as (lossy) UTF-8
        body: String,
    },
    /// The request failed; the text is the full error chain
    NetworkError(String),
}

impl ExecOutcome {
    /// Status code, if a response arrived
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status_code, .. } => Some(*status_code),
            Self::NetworkError(_) => None,
        }
    }
}

/// Classified result of one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// True only on a positive signal match
    pub success: bool,
    /// Always populated
    pub reason: String,
}

impl ProbeOutcome {
    /// A positive match
    #[must_use]
    pub fn matched(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: reason.into(),
        }
    }

    /// A failed probe
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: reason.into(),
        }
    }
}
