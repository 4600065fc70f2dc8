//! reqwest-backed probe executor.

use crate::config::ClientConfig;
use crate::executor::Executor;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use takeover_core::{ExecOutcome, ProbeSpec, Result, TakeoverError};
use tracing::{debug, warn};

/// Probe executor
#[derive(Clone)]
pub struct ProbeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    /// Follows redirects
    follow: HttpClient,
    /// Reports the first response as is
    direct: HttpClient,
    max_body_bytes: usize,
}

impl ProbeClient {
    /// Create a client with default settings
    pub fn new() -> Result<Self> {
        ProbeClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> ProbeClientBuilder {
        ProbeClientBuilder::new()
    }

    /// Send one probe and report the response or the failure
    pub async fn execute(&self, probe: &ProbeSpec) -> ExecOutcome {
        let http = if probe.follows_redirects() {
            &self.inner.follow
        } else {
            &self.inner.direct
        };
        debug!(url = %probe.url, host = ?probe.host_override(), "GET probe");

        let response = match http
            .get(&probe.url)
            .headers(header_map(&probe.headers))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ExecOutcome::NetworkError(error_chain(&e)),
        };

        let status_code = response.status().as_u16();
        match read_body(response, self.inner.max_body_bytes).await {
            Ok(body) => ExecOutcome::Response { status_code, body },
            Err(e) => ExecOutcome::NetworkError(error_chain(&e)),
        }
    }
}

#[async_trait]
impl Executor for ProbeClient {
    async fn execute(&self, probe: &ProbeSpec) -> ExecOutcome {
        Self::execute(self, probe).await
    }
}

/// Read at most `limit` bytes of the body as lossy UTF-8
async fn read_body(mut response: reqwest::Response, limit: usize) -> reqwest::Result<String> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = limit.saturating_sub(body.len());
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

fn header_map(headers: &[(String, String)]) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => warn!(header = %name, "skipping invalid probe header"),
        }
    }
    map
}

/// Render an error with its whole source chain.
///
/// reqwest keeps the resolver message ("Name or service not known") a few
/// levels down, so the top-level `Display` alone is not enough.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

/// Builder for configuring a [`ProbeClient`]
#[derive(Debug, Default)]
pub struct ProbeClientBuilder {
    config: ClientConfig,
}

impl ProbeClientBuilder {
    /// Create a builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the default User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the body size cap
    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ProbeClient> {
        let follow = self.http_client(Policy::limited(self.config.max_redirects))?;
        let direct = self.http_client(Policy::none())?;

        Ok(ProbeClient {
            inner: Arc::new(ClientInner {
                follow,
                direct,
                max_body_bytes: self.config.max_body_bytes,
            }),
        })
    }

    fn http_client(&self, redirect: Policy) -> Result<HttpClient> {
        HttpClient::builder()
            .timeout(self.config.timeout)
            .user_agent(&self.config.user_agent)
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .redirect(redirect)
            .gzip(true)
            .build()
            .map_err(|e| TakeoverError::Client(error_chain(&e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer {
        message: &'static str,
        source: Option<Box<Layer>>,
    }

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source.as_deref().map(|s| s as _)
        }
    }

    #[test]
    fn error_chain_includes_nested_causes() {
        let err = Layer {
            message: "error sending request",
            source: Some(Box::new(Layer {
                message: "dns error",
                source: Some(Box::new(Layer {
                    message: "failed to lookup address information: Name or service not known",
                    source: None,
                })),
            })),
        };
        assert_eq!(
            error_chain(&err),
            "error sending request: dns error: failed to lookup address information: Name or service not known"
        );
    }

    #[test]
    fn error_chain_skips_repeated_text() {
        let err = Layer {
            message: "connect error: refused",
            source: Some(Box::new(Layer {
                message: "refused",
                source: None,
            })),
        };
        assert_eq!(error_chain(&err), "connect error: refused");
    }

    #[test]
    fn header_map_drops_invalid_headers() {
        let headers = vec![
            ("Host".to_string(), "abc.com".to_string()),
            ("Bad Header".to_string(), "x".to_string()),
        ];
        let map = header_map(&headers);
        assert_eq!(map.len(), 1);
        assert_eq!(map["host"], "abc.com");
    }
}
