// ── Session store ──
//
// Owns the signed-in identity and the loading/error flags around it.
// State lives in a `watch` channel so guards and views re-evaluate on every
// transition. Each completed transition is persisted (identity and flag
// only) through a `SessionPersistence` backend. `is_loading` stays set for
// as long as any sign-in or revalidation is in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use secrecy::SecretString;
use strum::Display;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use linkday_api::ApiClient;

use crate::error::CoreError;
use crate::fence::{RequestFence, Ticket, cancellable};
use crate::model::{Ack, RegisterRequest, UpdateProfileRequest, User};
use crate::persist::{PersistedSession, SessionPersistence};
use crate::validation;

const SESSION_KEY: &str = "session";

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Coarse lifecycle phase derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionPhase {
    Anonymous,
    Authenticating,
    Authenticated,
    Failed,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.is_loading {
            SessionPhase::Authenticating
        } else if self.is_authenticated {
            SessionPhase::Authenticated
        } else if self.error.is_some() {
            SessionPhase::Failed
        } else {
            SessionPhase::Anonymous
        }
    }

    fn rehydrate(persisted: PersistedSession) -> Self {
        let user = persisted.user.filter(|_| persisted.is_authenticated);
        Self {
            is_authenticated: user.is_some(),
            user,
            is_loading: false,
            error: None,
        }
    }

    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    fn sign_in(&mut self, user: User) {
        self.user = Some(user);
        self.is_authenticated = true;
        self.is_loading = false;
        self.error = None;
    }

    fn sign_out(&mut self) {
        self.user = None;
        self.is_authenticated = false;
        self.is_loading = false;
    }
}

/// Reactive owner of the authenticated identity.
pub struct SessionStore {
    api: Arc<ApiClient>,
    state: watch::Sender<SessionState>,
    persistence: Arc<dyn SessionPersistence>,
    fence: RequestFence,
    in_flight: AtomicUsize,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.borrow())
            .field("persistence", &self.persistence)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create the store, rehydrating identity from `persistence`.
    pub fn new(api: Arc<ApiClient>, persistence: Arc<dyn SessionPersistence>) -> Self {
        let initial = match persistence.load() {
            Ok(Some(persisted)) => SessionState::rehydrate(persisted),
            Ok(None) => SessionState::default(),
            Err(e) => {
                warn!(error = %e, "could not read persisted session; starting anonymous");
                SessionState::default()
            }
        };
        let (state, _) = watch::channel(initial);

        Self {
            api,
            state,
            persistence,
            fence: RequestFence::new(),
            in_flight: AtomicUsize::new(0),
        }
    }

    // ── Read side ────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Receive every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Whether a durable credential is present.
    pub fn has_credential(&self) -> bool {
        self.api.has_credential()
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Sign in with email and password.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
        cancel: &CancellationToken,
    ) -> Result<User, CoreError> {
        let ticket = self.begin();
        let result = cancellable(cancel, self.api.login(email, password)).await;
        self.settle();
        self.finish_sign_in(&ticket, result)
    }

    /// Create an account and sign in as it.
    pub async fn register(
        &self,
        request: &RegisterRequest,
        cancel: &CancellationToken,
    ) -> Result<User, CoreError> {
        let ticket = self.begin();
        let result = cancellable(cancel, self.api.register(request)).await;
        self.settle();
        self.finish_sign_in(&ticket, result)
    }

    /// Revalidate the stored credential against the backend.
    ///
    /// Without a credential this settles to anonymous without any request,
    /// unless a sign-in is in flight, which then decides the outcome.
    /// A rejected or unreachable revalidation drops the credential and
    /// settles to anonymous with no error; only cancellation is returned
    /// as `Err`.
    pub async fn check_auth(&self, cancel: &CancellationToken) -> Result<Option<User>, CoreError> {
        if !self.api.has_credential() {
            if self.in_flight() > 0 {
                debug!("no stored credential yet, deferring to pending sign-in");
                return Ok(None);
            }
            debug!("no stored credential, session is anonymous");
            let ticket = self.fence.issue(SESSION_KEY);
            self.commit(&ticket, SessionState::sign_out);
            return Ok(None);
        }

        let ticket = self.fence.issue(SESSION_KEY);
        self.enter_loading();
        let result = cancellable(cancel, self.api.current_user()).await;
        self.settle();
        match result {
            Ok(user) => {
                debug!(username = %user.username, "credential revalidated");
                self.commit(&ticket, |s| {
                    s.user = Some(user.clone());
                    s.is_authenticated = true;
                });
                Ok(Some(user))
            }
            Err(CoreError::Cancelled) => {
                debug!("revalidation cancelled");
                Err(CoreError::Cancelled)
            }
            Err(err) => {
                debug!(error = %err, "stored credential rejected");
                self.commit(&ticket, |s| {
                    if let Err(e) = self.api.set_credential(None) {
                        warn!(error = %e, "failed to clear stored credential");
                    }
                    s.sign_out();
                    s.error = None;
                });
                Ok(None)
            }
        }
    }

    /// Drop the credential and return to anonymous. No network call.
    pub fn logout(&self) -> Result<(), CoreError> {
        let ticket = self.fence.issue(SESSION_KEY);
        let cleared = self.api.logout();
        self.commit(&ticket, |s| {
            s.sign_out();
            s.error = None;
        });
        info!("signed out");
        cleared.map_err(CoreError::from)
    }

    /// End the session after the backend rejected the credential outside
    /// a session action. A sign-in in flight takes precedence.
    pub fn expire(&self, reason: &CoreError) {
        if self.in_flight() > 0 {
            debug!("credential rejected during sign-in, leaving session to it");
            return;
        }
        let ticket = self.fence.issue(SESSION_KEY);
        let message = reason.to_string();
        self.commit(&ticket, |s| {
            s.sign_out();
            s.error = Some(message);
        });
        info!("session expired");
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Update display fields and adopt the server's user record.
    pub async fn update_profile(
        &self,
        patch: &UpdateProfileRequest,
        cancel: &CancellationToken,
    ) -> Result<User, CoreError> {
        if patch.is_empty() {
            return Err(self.reject(CoreError::validation("profile", "Nothing to update")));
        }
        validation::validate_profile(patch).map_err(|e| self.reject(e))?;

        let ticket = self.fence.issue(SESSION_KEY);
        match cancellable(cancel, self.api.update_profile(patch)).await {
            Ok(user) => {
                self.commit(&ticket, |s| s.sign_in(user.clone()));
                Ok(user)
            }
            Err(err) => Err(self.record_failure(&ticket, err)),
        }
    }

    /// Change the username, then revalidate to pick up the new identity.
    pub async fn update_username(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<Ack, CoreError> {
        validation::validate_username(username).map_err(|e| self.reject(e))?;

        let ticket = self.fence.issue(SESSION_KEY);
        let ack = match cancellable(cancel, self.api.update_username(username)).await {
            Ok(ack) => ack,
            Err(err) => return Err(self.record_failure(&ticket, err)),
        };
        self.check_auth(cancel).await?;
        Ok(ack)
    }

    // ── Transition helpers ───────────────────────────────────────────

    /// Enter the authenticating phase and draw a ticket for it.
    fn begin(&self) -> Ticket {
        let ticket = self.fence.issue(SESSION_KEY);
        self.enter_loading();
        self.state.send_modify(|s| s.error = None);
        ticket
    }

    fn enter_loading(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.state.send_modify(|s| s.is_loading = true);
    }

    /// One auth request returned. Loading ends with the last one, even
    /// when its response is later dropped as stale.
    fn settle(&self) {
        let left = self.in_flight.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
        if left == 0 {
            self.state.send_modify(|s| s.is_loading = false);
        }
    }

    fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    fn finish_sign_in(&self, ticket: &Ticket, result: Result<User, CoreError>) -> Result<User, CoreError> {
        match result {
            Ok(user) => {
                info!(username = %user.username, "signed in");
                self.commit(ticket, |s| s.sign_in(user.clone()));
                Ok(user)
            }
            Err(CoreError::Cancelled) => {
                debug!("sign-in cancelled");
                Err(CoreError::Cancelled)
            }
            Err(err) => {
                let message = err.to_string();
                self.commit(ticket, |s| {
                    s.sign_out();
                    s.error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Record a failed non-auth action. A 401 also ends the session.
    fn record_failure(&self, ticket: &Ticket, err: CoreError) -> CoreError {
        if matches!(err, CoreError::Cancelled) {
            return err;
        }
        let message = err.to_string();
        let expired = err.is_unauthorized();
        self.commit(ticket, |s| {
            if expired {
                s.sign_out();
            }
            s.error = Some(message);
        });
        err
    }

    /// Record a client-side rejection; nothing was sent.
    fn reject(&self, err: CoreError) -> CoreError {
        let message = err.to_string();
        self.state.send_modify(|s| s.error = Some(message));
        err
    }

    /// Apply `update` if `ticket` is still current, then persist.
    ///
    /// `is_loading` follows the in-flight count rather than `update`.
    fn commit(&self, ticket: &Ticket, update: impl FnOnce(&mut SessionState)) {
        let loading = self.in_flight() > 0;
        let applied = self.fence.apply(ticket, || {
            self.state.send_modify(|s| {
                update(s);
                s.is_loading = loading;
            });
        });
        if applied.is_some() {
            self.persist();
        }
    }

    fn persist(&self) {
        let snapshot = self.state.borrow().persisted();
        if let Err(e) = self.persistence.save(&snapshot) {
            warn!(error = %e, "failed to persist session");
        }
    }
}
