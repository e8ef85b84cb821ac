// Shared transport configuration for building reqwest::Client instances.
//
// Timeout, user agent and the cookie jar that mirrors the credential are
// set here so the API client never assembles a builder by hand.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub cookie_jar: Arc<Jar>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("linkday/", env!("CARGO_PKG_VERSION")).into(),
            cookie_jar: Arc::new(Jar::default()),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a `reqwest::Client` with JSON headers and the cookie jar attached.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .cookie_provider(Arc::clone(&self.cookie_jar))
            .build()
            .map_err(crate::error::Error::Network)
    }
}
