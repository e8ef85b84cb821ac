// ── Link store ──
//
// The authenticated user's links, kept in a reactive collection. Every
// action calls the backend first and then touches only the records the
// response concerns; nothing here triggers an implicit refetch.

mod collection;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use linkday_api::ApiClient;

use crate::analytics::{AnalyticsSummary, DashboardOverview};
use crate::error::CoreError;
use crate::fence::{RequestFence, Ticket, cancellable};
use crate::model::{CreateLinkRequest, Link, UpdateLinkRequest};
use crate::session::SessionStore;
use crate::stream::LinkStream;
use crate::validation;

pub(crate) use collection::LinkCollection;
pub use collection::LinkSnapshot;

/// Fence key for whole-collection actions (fetch, reorder).
const COLLECTION_KEY: &str = "links";

/// Fence key of a create until the server names the new link.
const NEW_LINK_KEY: &str = "links:new";

fn link_key(id: &str) -> String {
    format!("link:{id}")
}

fn not_found(id: &str) -> CoreError {
    CoreError::NotFound {
        entity_type: "link".into(),
        identifier: id.into(),
    }
}

/// Loading and error flags shared by all link actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Reactive store of the signed-in user's links.
pub struct LinkStore {
    api: Arc<ApiClient>,
    links: LinkCollection,
    status: watch::Sender<StoreStatus>,
    fence: RequestFence,
    in_flight: AtomicUsize,
    session: Option<Arc<SessionStore>>,
}

impl std::fmt::Debug for LinkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkStore")
            .field("links", &self.links.len())
            .field("status", &*self.status.borrow())
            .finish_non_exhaustive()
    }
}

impl LinkStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        let (status, _) = watch::channel(StoreStatus::default());
        Self {
            api,
            links: LinkCollection::new(),
            status,
            fence: RequestFence::new(),
            in_flight: AtomicUsize::new(0),
            session: None,
        }
    }

    /// Sign `session` out whenever the backend rejects the credential.
    #[must_use]
    pub fn with_session(mut self, session: Arc<SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Links in display order.
    pub fn snapshot(&self) -> LinkSnapshot {
        self.links.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Link>> {
        self.links.get(id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Subscribe to collection changes.
    pub fn stream(&self) -> LinkStream {
        LinkStream::new(self.links.subscribe())
    }

    pub fn status(&self) -> StoreStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StoreStatus> {
        self.status.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.status.borrow().is_loading
    }

    pub fn error(&self) -> Option<String> {
        self.status.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.status.send_modify(|s| s.error = None);
    }

    /// Drop every local record without touching the server.
    pub fn clear(&self) {
        self.links.clear();
        self.status.send_modify(|s| *s = StoreStatus::default());
    }

    pub fn summary(&self) -> AnalyticsSummary {
        AnalyticsSummary::from_links(&self.snapshot())
    }

    pub fn overview(&self) -> DashboardOverview {
        DashboardOverview::from_links(&self.snapshot())
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Replace local state with the server's list.
    ///
    /// Links written by an action issued after this fetch keep their
    /// local record.
    pub async fn fetch_links(&self, cancel: &CancellationToken) -> Result<LinkSnapshot, CoreError> {
        let ticket = self.fence.issue(COLLECTION_KEY);
        self.start();
        let result = cancellable(cancel, self.api.links()).await;
        self.settle();

        match result {
            Ok(links) => {
                let count = links.len();
                self.fence.apply(&ticket, || {
                    let merged = self.merge_fetched(&ticket, links);
                    self.links.replace_all(merged);
                });
                debug!(count, "links loaded");
                Ok(self.links.snapshot())
            }
            Err(err) => Err(self.fail(&ticket, err)),
        }
    }

    /// Create a link and append the server's record.
    pub async fn create_link(
        &self,
        request: &CreateLinkRequest,
        cancel: &CancellationToken,
    ) -> Result<Link, CoreError> {
        validation::validate_new_link(request).map_err(|e| self.reject(e))?;

        let ticket = self.fence.issue(NEW_LINK_KEY);
        self.start();
        let result = cancellable(cancel, self.api.create_link(request)).await;
        self.settle();

        match result {
            Ok(link) => {
                let created = ticket.rebind(link_key(&link.id));
                self.fence.apply(&created, || self.links.upsert(link.clone()));
                info!(id = %link.id, title = %link.title, "link created");
                Ok(link)
            }
            Err(err) => Err(self.fail(&ticket, err)),
        }
    }

    /// Apply a partial update and adopt the server's record.
    ///
    /// The request is sent even when `id` is not held locally; in that
    /// case nothing is inserted and the call fails with `NotFound`.
    pub async fn update_link(
        &self,
        id: &str,
        patch: &UpdateLinkRequest,
        cancel: &CancellationToken,
    ) -> Result<Link, CoreError> {
        if patch.is_empty() {
            return Err(self.reject(CoreError::validation("link", "Nothing to update")));
        }
        validation::validate_link_patch(patch).map_err(|e| self.reject(e))?;

        let ticket = self.fence.issue(link_key(id));
        self.start();
        let result = cancellable(cancel, self.api.update_link(id, patch)).await;
        self.settle();

        let link = match result {
            Ok(link) => link,
            Err(err) => return Err(self.fail(&ticket, err)),
        };

        let held = self.fence.apply(&ticket, || {
            if self.links.contains(id) {
                self.links.upsert(link.clone());
                true
            } else {
                let message = not_found(id).to_string();
                self.status.send_modify(|s| s.error = Some(message));
                false
            }
        });

        if held == Some(false) {
            debug!(%id, "updated link is not held locally");
            return Err(not_found(id));
        }
        Ok(link)
    }

    /// Flip `is_active` on a locally held link.
    pub async fn toggle_active(&self, id: &str, cancel: &CancellationToken) -> Result<Link, CoreError> {
        let current = self.links.get(id).ok_or_else(|| self.reject(not_found(id)))?;
        let patch = UpdateLinkRequest {
            is_active: Some(!current.is_active),
            ..Default::default()
        };
        self.update_link(id, &patch, cancel).await
    }

    /// Delete a link; local state changes only once the server agrees.
    pub async fn delete_link(&self, id: &str, cancel: &CancellationToken) -> Result<(), CoreError> {
        let ticket = self.fence.issue(link_key(id));
        self.start();
        let result = cancellable(cancel, self.api.delete_link(id)).await;
        self.settle();

        match result {
            Ok(_) => {
                self.fence.apply(&ticket, || self.links.remove(id));
                info!(%id, "link deleted");
                Ok(())
            }
            Err(err) => Err(self.fail(&ticket, err)),
        }
    }

    /// Persist a new display order.
    ///
    /// `ids` must be an exact permutation of the held ids. On success each
    /// link's `order` becomes its position in `ids`.
    pub async fn reorder_links(&self, ids: &[String], cancel: &CancellationToken) -> Result<(), CoreError> {
        self.check_permutation(ids).map_err(|e| self.reject(e))?;

        let ticket = self.fence.issue(COLLECTION_KEY);
        match cancellable(cancel, self.api.reorder_links(ids)).await {
            Ok(_) => {
                self.fence.apply(&ticket, || self.links.resequence(ids));
                debug!(count = ids.len(), "links reordered");
                Ok(())
            }
            Err(err) => Err(self.fail(&ticket, err)),
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn check_permutation(&self, ids: &[String]) -> Result<(), CoreError> {
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            if !self.links.contains(id) {
                return Err(CoreError::validation("link_ids", format!("Unknown link id: {id}")));
            }
            if !seen.insert(id.as_str()) {
                return Err(CoreError::validation("link_ids", format!("Duplicate link id: {id}")));
            }
        }
        let missing: Vec<String> = self
            .links
            .snapshot()
            .iter()
            .filter(|l| !seen.contains(l.id.as_str()))
            .map(|l| l.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::validation(
                "link_ids",
                format!("Missing link ids: {}", missing.join(", ")),
            ));
        }
        Ok(())
    }

    /// Server records, except where a newer local write owns the entity.
    fn merge_fetched(&self, ticket: &Ticket, fetched: Vec<Link>) -> Vec<Link> {
        let newer = |id: &str| self.fence.superseded_on(&link_key(id), ticket);

        let mut seen = HashSet::with_capacity(fetched.len());
        let mut merged: Vec<Link> = fetched
            .into_iter()
            .filter_map(|link| {
                seen.insert(link.id.clone());
                if newer(&link.id) {
                    self.links.get(&link.id).map(|held| Link::clone(&held))
                } else {
                    Some(link)
                }
            })
            .collect();

        // Created after the fetch was issued, so absent from its response.
        merged.extend(
            self.links
                .snapshot()
                .iter()
                .filter(|held| !seen.contains(&held.id) && newer(&held.id))
                .map(|held| Link::clone(held)),
        );
        merged
    }

    fn start(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        self.status.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
    }

    /// One request finished; loading ends with the last one.
    fn settle(&self) {
        let left = self.in_flight.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
        self.status.send_modify(|s| s.is_loading = left > 0);
    }

    /// Record a client-side rejection; nothing was sent.
    fn reject(&self, err: CoreError) -> CoreError {
        let message = err.to_string();
        self.status.send_modify(|s| s.error = Some(message));
        err
    }

    /// Record a failed request unless a newer one already settled the key.
    ///
    /// A rejected credential ends the session and forgets its links.
    fn fail(&self, ticket: &Ticket, err: CoreError) -> CoreError {
        if matches!(err, CoreError::Cancelled) {
            return err;
        }
        let message = err.to_string();
        self.fence.apply(ticket, || {
            self.status.send_modify(|s| s.error = Some(message));
        });
        if err.is_unauthorized() {
            self.links.clear();
            if let Some(session) = &self.session {
                session.expire(&err);
            }
        }
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::link;
    use linkday_api::{MemoryCredentialStore, TransportConfig};
    use url::Url;

    fn offline_store() -> LinkStore {
        let api = ApiClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Arc::new(MemoryCredentialStore::new()),
            &TransportConfig::default(),
        )
        .unwrap();
        let store = LinkStore::new(Arc::new(api));
        store
            .links
            .replace_all(vec![link("a", 0), link("b", 1), link("c", 2)]);
        store
    }

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn permutation_accepts_exact_reordering() {
        let store = offline_store();
        assert!(store.check_permutation(&ids(&["c", "a", "b"])).is_ok());
        assert!(store.check_permutation(&ids(&["a", "b", "c"])).is_ok());
    }

    #[tokio::test]
    async fn permutation_rejects_unknown_duplicate_and_missing() {
        let store = offline_store();
        for bad in [
            ids(&["a", "b", "zzz"]),
            ids(&["a", "a", "b"]),
            ids(&["a", "b"]),
            ids(&["a", "b", "c", "c"]),
        ] {
            let err = store.check_permutation(&bad).unwrap_err();
            assert!(err.is_validation(), "{bad:?}: {err:?}");
        }
    }

    #[tokio::test]
    async fn invalid_reorder_records_error_without_network() {
        let store = offline_store();
        let cancel = CancellationToken::new();
        let err = store
            .reorder_links(&ids(&["a"]), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.error().unwrap().contains("Missing link ids"));

        let order: Vec<String> = store.snapshot().iter().map(|l| l.id.clone()).collect();
        assert_eq!(order, ids(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn toggle_of_unknown_link_fails_locally() {
        let store = offline_store();
        let err = store
            .toggle_active("nope", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn clear_resets_links_and_status() {
        let store = offline_store();
        store.reject(CoreError::Internal("x".into()));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.status(), StoreStatus::default());
    }
}
