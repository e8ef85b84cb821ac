// ── Core error types ──
//
// Store-level errors. Stores record `to_string()` of these as their
// user-visible `error` and then hand the error back to the caller.
// The `From<linkday_api::Error>` impl folds transport details into the
// four-way taxonomy: network, unauthorized, request failed, validation.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach the server: {reason}")]
    Network { reason: String },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("{message}")]
    RequestFailed {
        message: String,
        /// HTTP status code (absent when the envelope itself reported failure).
        status: Option<u16>,
    },

    // ── Client-side ──────────────────────────────────────────────────
    #[error("{field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// The caller's view went away before the response arrived.
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Failed to persist session: {message}")]
    Persistence { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<linkday_api::Error> for CoreError {
    fn from(err: linkday_api::Error) -> Self {
        match err {
            linkday_api::Error::Unauthorized { message } => Self::Unauthorized { message },
            linkday_api::Error::Network(e) => Self::Network {
                reason: e.to_string(),
            },
            linkday_api::Error::RequestFailed { status, message } => Self::RequestFailed {
                message,
                status: Some(status),
            },
            linkday_api::Error::Rejected { message } => Self::RequestFailed {
                message,
                status: None,
            },
            linkday_api::Error::MissingData { operation } => {
                Self::Internal(format!("{operation}: response contained no data"))
            }
            linkday_api::Error::InvalidUrl(e) => Self::Internal(format!("Invalid URL: {e}")),
            linkday_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
            linkday_api::Error::CredentialStore(message) => Self::Persistence { message },
        }
    }
}
