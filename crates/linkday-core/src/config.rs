// ── Runtime client configuration ──
//
// Describes where the backend lives, where public pages are served and
// which routes the guards care about. Built by the front-end and handed
// in; core never reads config files.

use std::time::Duration;

use url::Url;

use crate::error::CoreError;

/// Public site base used when none is configured.
pub const DEFAULT_APP_URL: &str = "http://localhost:3001";

/// Route table used by the guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// Entry point for signing in; also the 401 destination.
    pub login: String,
    /// Landing page after signing in.
    pub dashboard: String,
    /// Paths at or under this prefix need a credential.
    pub protected_prefix: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/login".into(),
            dashboard: "/dashboard".into(),
            protected_prefix: "/dashboard".into(),
        }
    }
}

/// Configuration for talking to one LinkDay deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL (e.g. `http://localhost:3000`).
    pub api_url: Url,
    /// Base URL public profile pages are served from.
    pub app_url: Url,
    pub timeout: Duration,
    pub routes: Routes,
}

impl ClientConfig {
    pub fn new(api_url: Url, app_url: Url) -> Self {
        Self {
            api_url,
            app_url,
            timeout: Duration::from_secs(30),
            routes: Routes::default(),
        }
    }

    /// Configuration for the default local deployment.
    pub fn local() -> Result<Self, CoreError> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| CoreError::Internal(format!("invalid URL {raw}: {e}")))
        };
        Ok(Self::new(parse(linkday_api::DEFAULT_API_URL)?, parse(DEFAULT_APP_URL)?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `<app_url>/u/<username>`, the shareable page of `username`.
    pub fn public_profile_url(&self, username: &str) -> Result<Url, CoreError> {
        let mut url = self.app_url.clone();
        url.path_segments_mut()
            .map_err(|()| CoreError::Internal(format!("app URL cannot be a base: {}", self.app_url)))?
            .pop_if_empty()
            .extend(["u", username]);
        Ok(url)
    }
}
