// ── Request fencing and cancellation ──
//
// Every store action draws a ticket before it awaits the network. When the
// response lands, the ticket is admitted only if no newer ticket for the
// same key has already been applied; stale responses are dropped. Keys name
// logical entities, so responses for different entities never fence each
// other out.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::CoreError;

/// Proof that an action started at a given point in the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    key: String,
    seq: u64,
}

impl Ticket {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The same point in the sequence, fenced on another key.
    ///
    /// Used when the entity a request concerns is only known from its
    /// response.
    pub fn rebind(&self, key: impl Into<String>) -> Ticket {
        Ticket {
            key: key.into(),
            seq: self.seq,
        }
    }
}

/// Monotonic ticket dispenser with a per-key high-water mark.
#[derive(Debug, Default)]
pub struct RequestFence {
    next: AtomicU64,
    applied: DashMap<String, u64>,
    gate: Mutex<()>,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the next ticket for `key`.
    pub fn issue(&self, key: impl Into<String>) -> Ticket {
        let seq = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        Ticket {
            key: key.into(),
            seq,
        }
    }

    /// Run `apply` if `ticket` is not older than the latest applied ticket
    /// for its key.
    ///
    /// Applies are serialized across all keys, so `apply` may consult
    /// [`applied`](Self::applied) for other keys but must not call `apply`.
    pub fn apply<R>(&self, ticket: &Ticket, apply: impl FnOnce() -> R) -> Option<R> {
        let _gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut mark = self.applied.entry(ticket.key.clone()).or_insert(0);
            if ticket.seq <= *mark {
                warn!(
                    key = %ticket.key,
                    seq = ticket.seq,
                    applied = *mark,
                    "dropping stale response"
                );
                return None;
            }
            *mark = ticket.seq;
        }
        Some(apply())
    }

    /// Highest applied sequence for `key`.
    pub fn applied(&self, key: &str) -> Option<u64> {
        self.applied.get(key).map(|r| *r.value())
    }

    /// Whether something issued after `ticket` has been applied on `key`.
    pub fn superseded_on(&self, key: &str, ticket: &Ticket) -> bool {
        self.applied(key).is_some_and(|mark| mark > ticket.seq)
    }
}

/// Await `fut`, failing with [`CoreError::Cancelled`] if `cancel` fires
/// first. A response that arrives after cancellation is discarded.
pub async fn cancellable<T, E, F>(cancel: &CancellationToken, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<CoreError>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(CoreError::Cancelled),
        result = fut => {
            if cancel.is_cancelled() {
                Err(CoreError::Cancelled)
            } else {
                result.map_err(Into::into)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tickets_are_monotonic() {
        let fence = RequestFence::new();
        let a = fence.issue("k");
        let b = fence.issue("other");
        assert!(b.seq() > a.seq());
    }

    #[test]
    fn newer_ticket_fences_out_older_one() {
        let fence = RequestFence::new();
        let older = fence.issue("link:a");
        let newer = fence.issue("link:a");

        assert_eq!(fence.apply(&newer, || 2), Some(2));
        assert_eq!(fence.apply(&older, || 1), None);
        assert_eq!(fence.applied("link:a"), Some(newer.seq()));
    }

    #[test]
    fn keys_are_independent() {
        let fence = RequestFence::new();
        let a = fence.issue("link:a");
        let b = fence.issue("link:b");

        assert!(fence.apply(&b, || ()).is_some());
        assert!(fence.apply(&a, || ()).is_some());
    }

    #[test]
    fn a_ticket_applies_once() {
        let fence = RequestFence::new();
        let t = fence.issue("k");
        assert!(fence.apply(&t, || ()).is_some());
        assert!(fence.apply(&t, || ()).is_none());
    }

    #[test]
    fn rebound_ticket_keeps_its_place_in_the_sequence() {
        let fence = RequestFence::new();
        let pending = fence.issue("links:new");
        let later = fence.issue("link:x");
        let created = pending.rebind("link:n");

        assert_eq!(created.seq(), pending.seq());
        assert!(fence.apply(&created, || ()).is_some());
        assert!(fence.apply(&later, || ()).is_some());
        assert_eq!(fence.applied("links:new"), None);
    }

    #[test]
    fn apply_may_inspect_other_keys() {
        let fence = RequestFence::new();
        let fetch = fence.issue("links");
        let update = fence.issue("link:a");
        fence.apply(&update, || ());

        let seen = fence.apply(&fetch, || {
            (fence.superseded_on("link:a", &fetch), fence.superseded_on("link:b", &fetch))
        });
        assert_eq!(seen, Some((true, false)));
    }

    #[tokio::test]
    async fn cancelled_token_wins() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = cancellable(&cancel, async { Ok::<_, CoreError>(1) }).await;
        assert!(matches!(result, Err(CoreError::Cancelled)));
    }

    #[tokio::test]
    async fn live_token_passes_result_through() {
        let cancel = CancellationToken::new();
        let result = cancellable(&cancel, async { Ok::<_, CoreError>(7) }).await;
        assert_eq!(result.unwrap(), 7);

        let err = cancellable(&cancel, async {
            Err::<(), _>(CoreError::Internal("boom".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Internal(_)));
    }
}
