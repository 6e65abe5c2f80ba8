// Shared transport configuration for building reqwest::Client instances.
//
// Timeout, user agent and default headers live here so the admin client
// and any ad-hoc caller build identical HTTP clients.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;

const JSON: &str = "application/json";

/// Headers the admin API requires on every request.
///
/// Applied after caller-supplied headers so they can never be overridden.
const REQUIRED_HEADERS: [(HeaderName, &str); 2] = [(CONTENT_TYPE, JSON), (ACCEPT, JSON)];

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Extra headers sent with every request (e.g. a reverse-proxy token).
    pub headers: HeaderMap,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("docbot/", env!("CARGO_PKG_VERSION")).into(),
            headers: HeaderMap::new(),
        }
    }
}

impl TransportConfig {
    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a caller-supplied default header.
    ///
    /// Required JSON headers still win when the client is built.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The effective default headers: caller headers merged under the
    /// required JSON content headers.
    pub fn default_headers(&self) -> HeaderMap {
        let mut headers = self.headers.clone();
        for (name, value) in REQUIRED_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }
        headers
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(self.default_headers())
            .build()
            .map_err(Error::Transport)
    }
}
