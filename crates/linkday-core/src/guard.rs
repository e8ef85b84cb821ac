// ── Route guards ──
//
// Three checkpoints decide whether a view renders:
//
// - `EdgeGuard` runs before any session state exists and only looks for a
//   `token` cookie on protected paths.
// - `AuthPagesGuard` keeps signed-in users off the login/register views.
// - `ProtectedGuard` revalidates a stored credential on mount and hides
//   protected views until the session settles.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use linkday_api::COOKIE_NAME;
use linkday_api::credential::cookie_value;

use crate::config::Routes;
use crate::error::CoreError;
use crate::model::User;
use crate::session::{SessionState, SessionStore};

/// Outcome of the edge check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeDecision {
    Next,
    Redirect(String),
}

/// What a guarded view should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView {
    /// Neutral loading indicator.
    Loading,
    /// Render nothing.
    Blank,
    /// Go elsewhere instead of rendering.
    Redirect(String),
    Render,
}

/// Side effect a protected view performs when it mounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountAction {
    CheckAuth,
    RedirectToLogin(String),
    None,
}

/// Result of driving a protected view to a settled decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Admitted(User),
    Redirect(String),
}

// ── Edge ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct EdgeGuard {
    protected_prefix: String,
    login: String,
}

impl EdgeGuard {
    pub fn new(routes: &Routes) -> Self {
        Self {
            protected_prefix: routes.protected_prefix.trim_end_matches('/').to_owned(),
            login: routes.login.clone(),
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        path.strip_prefix(self.protected_prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Presence check only; the token is not validated here.
    pub fn check(&self, path: &str, cookie_header: Option<&str>) -> EdgeDecision {
        if !self.is_protected(path) {
            return EdgeDecision::Next;
        }
        let has_token = cookie_header
            .and_then(|header| cookie_value(header, COOKIE_NAME))
            .is_some();
        if has_token {
            EdgeDecision::Next
        } else {
            debug!(%path, "no credential cookie on protected path");
            EdgeDecision::Redirect(self.login.clone())
        }
    }
}

// ── Login / register views ───────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AuthPagesGuard {
    dashboard: String,
}

impl AuthPagesGuard {
    pub fn new(routes: &Routes) -> Self {
        Self {
            dashboard: routes.dashboard.clone(),
        }
    }

    pub fn evaluate(&self, state: &SessionState) -> GuardView {
        if state.is_loading {
            GuardView::Loading
        } else if state.is_authenticated {
            GuardView::Redirect(self.dashboard.clone())
        } else {
            GuardView::Render
        }
    }
}

// ── Protected views ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProtectedGuard {
    login: String,
}

impl ProtectedGuard {
    pub fn new(routes: &Routes) -> Self {
        Self {
            login: routes.login.clone(),
        }
    }

    pub fn on_mount(&self, state: &SessionState, has_credential: bool) -> MountAction {
        if !has_credential {
            MountAction::RedirectToLogin(self.login.clone())
        } else if !state.is_authenticated && !state.is_loading {
            MountAction::CheckAuth
        } else {
            MountAction::None
        }
    }

    pub fn evaluate(&self, state: &SessionState) -> GuardView {
        if state.is_loading {
            GuardView::Loading
        } else if !state.is_authenticated {
            GuardView::Blank
        } else {
            GuardView::Render
        }
    }

    /// Run the mount effect and wait for the session to settle.
    ///
    /// A failed revalidation drops the credential, so the second mount
    /// pass redirects to login.
    pub async fn enter(&self, session: &SessionStore, cancel: &CancellationToken) -> Result<Entry, CoreError> {
        for _ in 0..2 {
            match self.on_mount(&session.state(), session.has_credential()) {
                MountAction::RedirectToLogin(path) => return Ok(Entry::Redirect(path)),
                MountAction::CheckAuth => {
                    session.check_auth(cancel).await?;
                }
                MountAction::None => break,
            }
        }

        let state = session.state();
        match (self.evaluate(&state), state.user) {
            (GuardView::Render, Some(user)) => Ok(Entry::Admitted(user)),
            _ => Ok(Entry::Redirect(self.login.clone())),
        }
    }
}
