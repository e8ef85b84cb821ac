// ── Reactive link collection ──
//
// Lock-free concurrent storage keyed by link id, with push-based change
// notification via `watch` channels. The snapshot subscribers receive is
// always sorted by `order`.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::Link;

/// Ordered snapshot handed to subscribers.
pub type LinkSnapshot = Arc<Vec<Arc<Link>>>;

/// Keyed link storage with an ordered, versioned snapshot.
///
/// Every mutation bumps a version counter and rebuilds the snapshot, so a
/// reader never sees a half-applied change.
pub(crate) struct LinkCollection {
    by_id: DashMap<String, Arc<Link>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot in display order.
    snapshot: watch::Sender<LinkSnapshot>,
}

impl LinkCollection {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace a link. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, link: Link) -> bool {
        let is_new = self
            .by_id
            .insert(link.id.clone(), Arc::new(link))
            .is_none();
        self.rebuild_snapshot();
        self.bump_version();
        is_new
    }

    /// Replace the whole collection with `links`.
    ///
    /// Upserts first, then prunes ids absent from the incoming set, so a
    /// subscriber never observes an empty intermediate state.
    pub(crate) fn replace_all(&self, links: Vec<Link>) {
        let incoming: HashSet<String> = links.iter().map(|l| l.id.clone()).collect();
        for link in links {
            self.by_id.insert(link.id.clone(), Arc::new(link));
        }
        self.by_id.retain(|id, _| incoming.contains(id));
        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Remove a link by id. Returns the removed link if it existed.
    pub(crate) fn remove(&self, id: &str) -> Option<Arc<Link>> {
        let removed = self.by_id.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    /// Rewrite `order` so the collection follows `ids` exactly.
    ///
    /// Callers validate that `ids` is a permutation of the current ids.
    pub(crate) fn resequence(&self, ids: &[String]) {
        for (position, id) in ids.iter().enumerate() {
            if let Some(mut entry) = self.by_id.get_mut(id) {
                let mut link = Link::clone(entry.value());
                link.order = u32::try_from(position).unwrap_or(u32::MAX);
                *entry.value_mut() = Arc::new(link);
            }
        }
        self.rebuild_snapshot();
        self.bump_version();
    }

    pub(crate) fn get(&self, id: &str) -> Option<Arc<Link>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> LinkSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<LinkSnapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Remove all links.
    pub(crate) fn clear(&self) {
        self.by_id.clear();
        self.rebuild_snapshot();
        self.bump_version();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values in display order and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut values: Vec<Arc<Link>> = self.by_id.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
