use thiserror::Error;

/// Top-level error type for the `linkday-api` crate.
///
/// Every outbound call funnels its failure into one of these variants.
/// `linkday-core` maps them into the store-level error channel.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend answered 401. The credential has already been cleared
    /// and the login navigation triggered by the time this is returned.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// No response at all (connection refused, DNS failure, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-2xx response other than 401, carrying the server's message.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// 2xx response whose envelope reported `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    /// The envelope was successful but `data` was missing where required.
    #[error("{operation}: response contained no data")]
    MissingData { operation: &'static str },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Credential storage ──────────────────────────────────────────
    /// The durable credential store could not be read or written.
    #[error("Credential store error: {0}")]
    CredentialStore(String),
}

impl Error {
    /// Returns `true` if the backend rejected the credential.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::RequestFailed { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the backend reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RequestFailed { status: 404, .. })
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::RequestFailed { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
