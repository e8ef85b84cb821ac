//! Shared configuration for LinkDay tools.
//!
//! TOML profiles layered under `LINKDAY_` environment variables, platform
//! data directories, and the durable credential backend each profile uses.
//! Translates a profile into a `linkday_core::ClientConfig`.

mod keyring_store;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use linkday_api::{CredentialStore, DEFAULT_API_URL, FileCredentialStore};
use linkday_core::{ClientConfig, DEFAULT_APP_URL, FileSessionPersistence};

pub use keyring_store::{KEYRING_SERVICE, KeyringCredentialStore};

/// Environment prefix for every override.
pub const ENV_PREFIX: &str = "LINKDAY_";

/// Name of the profile used when none is selected.
pub const DEFAULT_PROFILE: &str = "default";

const CREDENTIAL_FILE: &str = "credential.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    /// Backend URL applied over every profile (`LINKDAY_API_URL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named deployments.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            api_url: None,
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named LinkDay deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL public pages are served from.
    #[serde(default = "default_app_url")]
    pub app_url: String,

    /// Where the bearer credential is kept between runs.
    #[serde(default)]
    pub credential_store: CredentialBackend,

    /// Override the global timeout (seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            app_url: default_app_url(),
            credential_store: CredentialBackend::default(),
            timeout: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_app_url() -> String {
    DEFAULT_APP_URL.into()
}

/// Durable credential backend of a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// JSON file in the profile's data directory.
    #[default]
    File,
    /// Operating system keyring.
    Keyring,
}

impl Config {
    /// Name of the active profile: explicit choice, then the configured
    /// default, then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    /// Look up a profile. The default profile exists implicitly.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == DEFAULT_PROFILE => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }

    /// Build the runtime client configuration for `profile`.
    pub fn client_config(&self, profile: &Profile) -> Result<ClientConfig, ConfigError> {
        let api_url = self.api_url.as_deref().unwrap_or(&profile.api_url);
        let timeout = profile.timeout.unwrap_or(self.defaults.timeout);
        Ok(
            ClientConfig::new(parse_url("api_url", api_url)?, parse_url("app_url", &profile.app_url)?)
                .with_timeout(Duration::from_secs(timeout)),
        )
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "linkday", "linkday")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Root of per-profile state (credential and session files).
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || fallback_dir(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

/// State directory of one profile.
pub fn profile_data_dir(root: &Path, profile_name: &str) -> PathBuf {
    root.join("profiles").join(profile_name)
}

fn fallback_dir(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("linkday");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` plus environment. A missing file yields defaults.
///
/// `LINKDAY_API_URL` maps to the top-level `api_url`; nested keys use a
/// double underscore (`LINKDAY_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Durable stores ──────────────────────────────────────────────────

/// Credential backend for `profile`, rooted at `root` when file-based.
pub fn credential_store(root: &Path, profile_name: &str, profile: &Profile) -> Arc<dyn CredentialStore> {
    match profile.credential_store {
        CredentialBackend::File => Arc::new(FileCredentialStore::new(
            profile_data_dir(root, profile_name).join(CREDENTIAL_FILE),
        )),
        CredentialBackend::Keyring => Arc::new(KeyringCredentialStore::new(profile_name)),
    }
}

/// Session persistence for `profile_name`.
pub fn session_persistence(root: &Path, profile_name: &str) -> FileSessionPersistence {
    FileSessionPersistence::in_dir(&profile_data_dir(root, profile_name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("absent.toml")).unwrap();
            assert_eq!(cfg.default_profile.as_deref(), Some("default"));
            assert_eq!(cfg.defaults.timeout, 30);
            assert!(cfg.profiles.is_empty());

            let profile = cfg.profile("default").unwrap();
            assert_eq!(profile.api_url, "http://localhost:3000");
            Ok(())
        });
    }

    #[test]
    fn file_profiles_are_parsed() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                default_profile = "prod"

                [defaults]
                output = "json"

                [profiles.prod]
                api_url = "https://api.linkday.example"
                app_url = "https://linkday.example"
                credential_store = "keyring"
                timeout = 5
                "#,
            )?;

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.active_profile_name(None), "prod");
            assert_eq!(cfg.defaults.output, "json");

            let profile = cfg.profile("prod").unwrap();
            assert_eq!(profile.credential_store, CredentialBackend::Keyring);

            let client = cfg.client_config(&profile).unwrap();
            assert_eq!(client.api_url.as_str(), "https://api.linkday.example/");
            assert_eq!(client.timeout, Duration::from_secs(5));
            Ok(())
        });
    }

    #[test]
    fn env_api_url_overrides_every_profile() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [profiles.default]
                api_url = "https://from-file.example"
                "#,
            )?;
            jail.set_env("LINKDAY_API_URL", "http://127.0.0.1:4000");
            jail.set_env("LINKDAY_DEFAULTS__TIMEOUT", "7");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            let profile = cfg.profile("default").unwrap();
            let client = cfg.client_config(&profile).unwrap();
            assert_eq!(client.api_url.as_str(), "http://127.0.0.1:4000/");
            assert_eq!(client.timeout, Duration::from_secs(7));
            Ok(())
        });
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("staging"),
            Err(ConfigError::UnknownProfile { .. })
        ));
        assert_eq!(cfg.active_profile_name(Some("staging")), "staging");
    }

    #[test]
    fn invalid_url_is_a_validation_error() {
        let cfg = Config::default();
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = cfg.client_config(&profile).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }

    #[test]
    fn save_then_load_round_trips_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "local".into(),
            Profile {
                timeout: Some(3),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        Jail::expect_with(|_jail| {
            let loaded = load_config_from(&path).unwrap();
            assert_eq!(loaded.profile("local").unwrap().timeout, Some(3));
            Ok(())
        });
    }

    #[test]
    fn file_backend_lives_under_profile_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = credential_store(dir.path(), "work", &Profile::default());
        assert!(store.load().unwrap().is_none());

        let session = session_persistence(dir.path(), "work");
        assert!(session.path().starts_with(dir.path().join("profiles").join("work")));
    }
}
