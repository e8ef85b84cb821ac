// ── Reactive link stream ──
//
// Subscription type for consuming link collection changes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::store::LinkSnapshot;

/// A subscription to the ordered link collection.
///
/// Offers the snapshot captured at creation, the latest one, and change
/// notification via [`changed`](Self::changed) or as a `Stream`.
pub struct LinkStream {
    current: LinkSnapshot,
    receiver: watch::Receiver<LinkSnapshot>,
}

impl LinkStream {
    pub(crate) fn new(receiver: watch::Receiver<LinkSnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    pub fn current(&self) -> &LinkSnapshot {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> LinkSnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<LinkSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    pub fn into_stream(self) -> LinkWatchStream {
        LinkWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding a snapshot per collection change.
pub struct LinkWatchStream {
    inner: WatchStream<LinkSnapshot>,
}

impl Stream for LinkWatchStream {
    type Item = LinkSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
