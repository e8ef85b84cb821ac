// ── Application facade ──
//
// Wires one API client to the session and link stores and vends the
// guards configured for this deployment. A credential the link store sees
// rejected signs the session out. Front-ends hold a `Linkday` and
// never assemble the pieces themselves.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use linkday_api::{ApiClient, CredentialStore, Navigator, TransportConfig};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::fence::cancellable;
use crate::guard::{AuthPagesGuard, EdgeGuard, ProtectedGuard};
use crate::model::{Link, PublicProfile};
use crate::persist::SessionPersistence;
use crate::session::SessionStore;
use crate::store::LinkStore;

/// Entry point for front-ends.
///
/// Cheaply cloneable; clones share the same client and stores.
#[derive(Clone, Debug)]
pub struct Linkday {
    inner: Arc<LinkdayInner>,
}

#[derive(Debug)]
struct LinkdayInner {
    config: ClientConfig,
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    links: LinkStore,
}

impl Linkday {
    /// Build the client and rehydrate the session.
    pub fn new(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        persistence: Arc<dyn SessionPersistence>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let api = ApiClient::new(config.api_url.clone(), credentials, &transport)?
            .with_navigator(navigator)
            .with_login_path(config.routes.login.clone());
        let api = Arc::new(api);
        let session = Arc::new(SessionStore::new(Arc::clone(&api), persistence));
        let links = LinkStore::new(Arc::clone(&api)).with_session(Arc::clone(&session));

        Ok(Self {
            inner: Arc::new(LinkdayInner {
                session,
                links,
                api,
                config,
            }),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.inner.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    pub fn links(&self) -> &LinkStore {
        &self.inner.links
    }

    pub fn edge_guard(&self) -> EdgeGuard {
        EdgeGuard::new(&self.inner.config.routes)
    }

    pub fn auth_pages_guard(&self) -> AuthPagesGuard {
        AuthPagesGuard::new(&self.inner.config.routes)
    }

    pub fn protected_guard(&self) -> ProtectedGuard {
        ProtectedGuard::new(&self.inner.config.routes)
    }

    // ── Cross-store actions ──────────────────────────────────────────

    /// Sign out and forget the previous user's links.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.inner.links.clear();
        self.inner.session.logout()
    }

    /// Shareable page of the signed-in user.
    pub fn public_url(&self) -> Option<Result<Url, CoreError>> {
        let user = self.inner.session.user()?;
        Some(self.inner.config.public_profile_url(&user.username))
    }

    // ── Visitor surface ──────────────────────────────────────────────

    pub async fn public_profile(
        &self,
        username: &str,
        cancel: &CancellationToken,
    ) -> Result<PublicProfile, CoreError> {
        cancellable(cancel, self.inner.api.public_profile(username)).await
    }

    /// Record a click on `link` and return where the visitor should go.
    ///
    /// Tracking failures are logged and fall back to the link's own URL.
    pub async fn follow(&self, link: &Link, cancel: &CancellationToken) -> Result<String, CoreError> {
        match cancellable(cancel, self.inner.api.track_click(&link.id)).await {
            Ok(click) if !click.redirect_url.is_empty() => Ok(click.redirect_url),
            Ok(_) => Ok(link.url.clone()),
            Err(CoreError::Cancelled) => Err(CoreError::Cancelled),
            Err(e) => {
                warn!(id = %link.id, error = %e, "click tracking failed, opening link directly");
                Ok(link.url.clone())
            }
        }
    }
}
