// ── Session persistence ──
//
// Only the identity record and the authenticated flag survive a restart.
// Loading and error state always start from their defaults.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::User;

/// File name of the persisted session inside the data directory.
pub const SESSION_FILE: &str = "auth-storage.json";

const FORMAT_VERSION: u32 = 0;

/// The persisted slice of session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: Option<User>,
    pub is_authenticated: bool,
}

/// On-disk envelope around [`PersistedSession`].
#[derive(Debug, Serialize, Deserialize)]
struct Stored {
    state: PersistedSession,
    #[serde(default)]
    version: u32,
}

/// Durable home of the persisted session.
pub trait SessionPersistence: Send + Sync + fmt::Debug {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError>;
    fn save(&self, session: &PersistedSession) -> Result<(), CoreError>;
}

// ── File backend ─────────────────────────────────────────────────────

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<dir>/auth-storage.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(persistence(&self.path, &e)),
        };

        match serde_json::from_str::<Stored>(&raw) {
            Ok(stored) if stored.version == FORMAT_VERSION => Ok(Some(stored.state)),
            Ok(stored) => {
                warn!(version = stored.version, "ignoring persisted session with unknown version");
                Ok(None)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| persistence(parent, &e))?;
        }
        let stored = Stored {
            state: session.clone(),
            version: FORMAT_VERSION,
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| CoreError::Internal(format!("session serialization: {e}")))?;
        fs::write(&self.path, json).map_err(|e| persistence(&self.path, &e))?;
        debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }
}

fn persistence(path: &Path, err: &io::Error) -> CoreError {
    CoreError::Persistence {
        message: format!("{}: {err}", path.display()),
    }
}

// ── In-memory backend ────────────────────────────────────────────────

/// Process-local backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }

    /// The last saved value.
    pub fn stored(&self) -> Option<PersistedSession> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError> {
        Ok(self.stored())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }
}
