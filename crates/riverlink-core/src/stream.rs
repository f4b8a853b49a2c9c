// ── Reactive topology stream ──
//
// Subscription handle for consuming topology changes from the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Topology;

/// A subscription to the topology.
///
/// Provides both point-in-time snapshot access and change notification via
/// [`changed()`](Self::changed) or by converting into a `Stream`.
pub struct TopologyStream {
    current: Arc<Topology>,
    receiver: watch::Receiver<Arc<Topology>>,
}

impl TopologyStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<Topology>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot seen at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Topology> {
        &self.current
    }

    /// The latest snapshot, which may be newer than `current()`.
    pub fn latest(&self) -> Arc<Topology> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<Topology>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current snapshot first.
    pub fn into_stream(self) -> TopologyWatchStream {
        TopologyWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct TopologyWatchStream {
    inner: WatchStream<Arc<Topology>>,
}

impl Stream for TopologyWatchStream {
    type Item = Arc<Topology>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
