// ── Mode subscriptions ──
//
// Point-in-time access plus change notification for published snapshots.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::ModeSnapshot;

/// A subscription to the engine's published [`ModeSnapshot`].
#[derive(Debug)]
pub struct ModeStream {
    current: ModeSnapshot,
    receiver: watch::Receiver<ModeSnapshot>,
}

impl ModeStream {
    pub(crate) fn new(mut receiver: watch::Receiver<ModeSnapshot>) -> Self {
        let current = *receiver.borrow_and_update();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> ModeSnapshot {
        self.current
    }

    /// The latest published snapshot.
    pub fn latest(&self) -> ModeSnapshot {
        *self.receiver.borrow()
    }

    /// Wait for the next change. `None` once the engine has stopped.
    pub async fn changed(&mut self) -> Option<ModeSnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = *self.receiver.borrow_and_update();
        self.current = snap;
        Some(snap)
    }

    /// Convert into a `Stream` that yields the current snapshot first and
    /// then every change.
    pub fn into_stream(self) -> ModeWatchStream {
        ModeWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct ModeWatchStream {
    inner: WatchStream<ModeSnapshot>,
}

impl Stream for ModeWatchStream {
    type Item = ModeSnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
