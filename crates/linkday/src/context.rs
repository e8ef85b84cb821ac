//! Per-invocation wiring: config file, active profile, durable stores and
//! the `Linkday` facade, plus Ctrl-C cancellation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use linkday_api::Navigator;
use linkday_config::{self as config, Config};
use linkday_core::{CancellationToken, Linkday, SessionPersistence};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Paths ────────────────────────────────────────────────────────────

/// Where this invocation reads and writes configuration and state.
#[derive(Debug, Clone)]
pub struct Paths {
    pub config: PathBuf,
    pub data: PathBuf,
}

impl Paths {
    pub fn resolve(global: &GlobalOpts) -> Self {
        Self {
            config: global.config.clone().unwrap_or_else(config::config_path),
            data: global.data_dir.clone().unwrap_or_else(config::data_dir),
        }
    }

    pub fn load(&self) -> Result<Config, CliError> {
        Ok(config::load_config_from(&self.config)?)
    }
}

// ── Navigation ───────────────────────────────────────────────────────

/// The CLI has no page to leave; a forced return to login becomes a hint.
#[derive(Debug)]
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        warn!(path, "session rejected by the backend, run `linkday login`");
    }
}

// ── Context ──────────────────────────────────────────────────────────

/// Everything a backend-bound command handler needs.
pub struct Context {
    pub app: Linkday,
    pub profile: String,
    pub cancel: CancellationToken,
    pub color: bool,
}

impl Context {
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let paths = Paths::resolve(global);
        let mut cfg = paths.load()?;

        if let Some(ref api_url) = global.api_url {
            Url::parse(api_url).map_err(|e| CliError::Validation {
                field: "api-url".into(),
                reason: format!("invalid URL '{api_url}': {e}"),
            })?;
            cfg.api_url = Some(api_url.clone());
        }

        let profile_name = cfg.active_profile_name(global.profile.as_deref());
        let profile = cfg.profile(&profile_name).map_err(|_| CliError::ProfileNotFound {
            name: profile_name.clone(),
            available: available_profiles(&cfg),
        })?;

        let mut client = cfg.client_config(&profile)?;
        if let Some(secs) = global.timeout {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        debug!(
            profile = %profile_name,
            api_url = %client.api_url,
            data_dir = %paths.data.display(),
            "resolved client configuration"
        );

        let credentials = config::credential_store(&paths.data, &profile_name, &profile);
        let persistence: Arc<dyn SessionPersistence> =
            Arc::new(config::session_persistence(&paths.data, &profile_name));

        let app = Linkday::new(client, credentials, persistence, Arc::new(TerminalNavigator))?;

        Ok(Self {
            app,
            profile: profile_name,
            cancel: interrupt_token(),
            color: output::should_color(&global.color),
        })
    }
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

/// Token cancelled on the first Ctrl-C.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let on_signal = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received, cancelling in-flight request");
            on_signal.cancel();
        }
    });
    token
}
