//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use linkday_config::ConfigError;
use linkday_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the LinkDay backend")]
    #[diagnostic(
        code(linkday::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             Reason: {reason}\n\
             Point the CLI elsewhere with --api-url or LINKDAY_API_URL."
        )
    )]
    ConnectionFailed { reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Not signed in")]
    #[diagnostic(code(linkday::not_signed_in), help("Run: linkday login"))]
    NotSignedIn,

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(linkday::auth_failed),
        help(
            "The stored session is no longer valid and has been cleared.\n\
             Run: linkday login"
        )
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(linkday::not_found),
        help("List available items with: linkday {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(linkday::api_error))]
    ApiError { message: String, status: Option<u16> },

    // ── Input ────────────────────────────────────────────────────────

    #[error("Invalid {field}: {reason}")]
    #[diagnostic(code(linkday::validation))]
    Validation { field: String, reason: String },

    #[error("'{action}' needs confirmation but stdin is not a terminal")]
    #[diagnostic(
        code(linkday::non_interactive),
        help("Re-run with --yes to confirm non-interactively.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(linkday::profile_not_found),
        help("Available profiles: {available}\nCreate one with: linkday config init")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(linkday::config),
        help("Inspect the file reported by: linkday config path")
    )]
    Config(ConfigError),

    // ── Runtime ──────────────────────────────────────────────────────

    #[error("Interrupted")]
    #[diagnostic(code(linkday::interrupted))]
    Interrupted,

    #[error("{message}")]
    #[diagnostic(code(linkday::internal))]
    Internal { message: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(linkday::io))]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    #[diagnostic(code(linkday::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    #[diagnostic(code(linkday::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::NotSignedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ApiError { status: Some(404), .. } => {
                exit_code::NOT_FOUND
            }
            Self::ApiError { status: Some(403), .. } => exit_code::PERMISSION,
            Self::ApiError { status: Some(409), .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Interrupted => exit_code::INTERRUPTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },

            CoreError::Unauthorized { message } => CliError::AuthFailed { message },

            CoreError::RequestFailed { message, status } => CliError::ApiError { message, status },

            CoreError::ValidationFailed { field, reason } => CliError::Validation { field, reason },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Cancelled => CliError::Interrupted,

            CoreError::Persistence { message } | CoreError::Internal(message) => {
                CliError::Internal { message }
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_auth_exit_code() {
        let err = CliError::from(CoreError::Unauthorized {
            message: "Invalid token".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn missing_link_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "link".into(),
            identifier: "abc".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(err, CliError::NotFound { ref list_command, .. } if list_command == "links list"));
    }

    #[test]
    fn server_status_selects_exit_code() {
        let conflict = CliError::from(CoreError::RequestFailed {
            message: "Username already taken".into(),
            status: Some(409),
        });
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);

        let rejected = CliError::from(CoreError::RequestFailed {
            message: "nope".into(),
            status: None,
        });
        assert_eq!(rejected.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn validation_is_a_usage_error() {
        let err = CliError::from(CoreError::ValidationFailed {
            field: "url".into(),
            reason: "must be an absolute URL".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
