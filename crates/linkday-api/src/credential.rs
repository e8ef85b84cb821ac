// Bearer credential ownership
//
// The token lives in three places: process memory, a durable store that
// survives restarts, and a `token` cookie in the HTTP client's jar so
// cookie-based route checks can see it. `CredentialVault::set` is the only
// write path for all three.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwapOption;
use reqwest::cookie::{CookieStore, Jar};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;

/// Name of the cookie mirroring the credential.
pub const COOKIE_NAME: &str = "token";

/// Cookie lifetime: seven days.
pub const COOKIE_MAX_AGE_SECS: u64 = 7 * 24 * 60 * 60;

// ── Durable stores ──────────────────────────────────────────────────

/// Durable key-value slot holding the credential across restarts.
pub trait CredentialStore: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<SecretString>, Error>;
    fn save(&self, token: &SecretString) -> Result<(), Error>;
    fn clear(&self) -> Result<(), Error>;
}

/// Volatile store, for tests and one-shot invocations.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store, as if a previous run had logged in.
    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(token.to_owned())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slot.clone().map(SecretString::from))
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(token.expose_secret().to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredCredential {
    token: String,
}

/// JSON file holding `{ "token": "..." }`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::CredentialStore(format!("read {}: {e}", self.path.display()))),
        };
        match serde_json::from_str::<StoredCredential>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Ok(Some(SecretString::from(stored.token))),
            Ok(_) => Ok(None),
            Err(e) => {
                // A corrupt slot is treated as absent; the next write replaces it.
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable credential file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::CredentialStore(format!("create {}: {e}", parent.display())))?;
        }
        let body = serde_json::to_string(&StoredCredential {
            token: token.expose_secret().to_owned(),
        })
        .map_err(|e| Error::CredentialStore(e.to_string()))?;
        std::fs::write(&self.path, body)
            .map_err(|e| Error::CredentialStore(format!("write {}: {e}", self.path.display())))
    }

    fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::CredentialStore(format!("remove {}: {e}", self.path.display()))),
        }
    }
}

// ── Vault ───────────────────────────────────────────────────────────

/// Owner of every copy of the bearer credential.
pub struct CredentialVault {
    memory: ArcSwapOption<SecretString>,
    durable: Arc<dyn CredentialStore>,
    jar: Arc<Jar>,
    cookie_url: Url,
    write_lock: Mutex<()>,
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVault")
            .field("held", &self.memory.load().is_some())
            .field("durable", &self.durable)
            .field("cookie_url", &self.cookie_url.as_str())
            .finish_non_exhaustive()
    }
}

impl CredentialVault {
    /// Open the vault, rehydrating memory and cookie from the durable store.
    pub fn open(durable: Arc<dyn CredentialStore>, jar: Arc<Jar>, cookie_url: Url) -> Result<Self, Error> {
        let vault = Self {
            memory: ArcSwapOption::empty(),
            durable,
            jar,
            cookie_url,
            write_lock: Mutex::new(()),
        };
        if let Some(token) = vault.durable.load()? {
            debug!("rehydrated credential from durable store");
            vault.write_cookie(Some(&token));
            vault.memory.store(Some(Arc::new(token)));
        }
        Ok(vault)
    }

    /// Replace (or remove) the credential in memory, durable store and cookie.
    ///
    /// The durable write goes first: if it fails, nothing else changes when
    /// storing, and memory plus cookie are still cleared when removing.
    pub fn set(&self, token: Option<SecretString>) -> Result<(), Error> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match token {
            Some(token) => {
                self.durable.save(&token)?;
                self.write_cookie(Some(&token));
                self.memory.store(Some(Arc::new(token)));
                debug!("credential stored");
                Ok(())
            }
            None => {
                self.memory.store(None);
                self.write_cookie(None);
                let result = self.durable.clear();
                debug!("credential cleared");
                result
            }
        }
    }

    /// The in-memory credential, if held.
    pub fn token(&self) -> Option<Arc<SecretString>> {
        self.memory.load_full()
    }

    /// Whether the durable store currently holds a credential.
    pub fn has_durable(&self) -> bool {
        matches!(self.durable.load(), Ok(Some(_)))
    }

    /// The `Cookie` header value the client would send to the backend.
    pub fn cookie_header(&self) -> Option<String> {
        let value = self.jar.cookies(&self.cookie_url)?;
        value.to_str().ok().map(String::from)
    }

    /// The credential as seen through the cookie copy.
    pub fn cookie_token(&self) -> Option<String> {
        let header = self.cookie_header()?;
        cookie_value(&header, COOKIE_NAME).map(String::from)
    }

    /// `true` when memory, durable store and cookie all agree.
    pub fn is_consistent(&self) -> bool {
        let memory = self.token().map(|t| t.expose_secret().to_owned());
        let durable = match self.durable.load() {
            Ok(t) => t.map(|t| t.expose_secret().to_owned()),
            Err(_) => return false,
        };
        let cookie = self.cookie_token();
        memory == durable && durable == cookie
    }

    fn write_cookie(&self, token: Option<&SecretString>) {
        let raw = match token {
            Some(token) => format!(
                "{COOKIE_NAME}={}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax",
                token.expose_secret()
            ),
            None => format!(
                "{COOKIE_NAME}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; SameSite=Lax"
            ),
        };
        self.jar.add_cookie_str(&raw, &self.cookie_url);
    }
}

/// Pull one cookie's value out of a `Cookie` request header.
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
