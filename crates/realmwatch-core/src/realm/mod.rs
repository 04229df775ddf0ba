// ── Realm signal sources ──
//
// A realm source publishes the identifier of the network realm the device
// is associated with. Most hosts have no way to read it, so the default
// source never publishes anything and the engine falls back to the
// reachability heuristic.
//
// Vendor-specific detectors plug in by implementing `RealmSignalSource`.

mod probe;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::model::RealmUpdate;

pub use probe::ProbeRealmSource;

/// Callback the engine hands to a source.
pub type RealmCallback = Arc<dyn Fn(RealmUpdate) + Send + Sync>;

/// A producer of realm observations.
///
/// `start` consumes the source, so a source runs at most once. It returns
/// the handle of its background task, if it spawned one.
pub trait RealmSignalSource: Send + 'static {
    fn start(self: Box<Self>, publish: RealmCallback, cancel: CancellationToken)
    -> Option<JoinHandle<()>>;
}

/// Source for hosts that cannot observe the realm. Publishes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRealmSource;

impl RealmSignalSource for UnavailableRealmSource {
    fn start(
        self: Box<Self>,
        _publish: RealmCallback,
        _cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        tracing::debug!("realm source unavailable, relying on reachability");
        None
    }
}

/// Handle for pushing realm updates into a [`ChannelRealmSource`].
#[derive(Debug, Clone)]
pub struct RealmPublisher {
    tx: mpsc::UnboundedSender<RealmUpdate>,
}

impl RealmPublisher {
    /// Publish an observed realm. Returns `false` once the source is gone.
    pub fn observe(&self, realm: impl Into<String>) -> bool {
        self.tx.send(RealmUpdate::Observed(realm.into())).is_ok()
    }

    /// Withdraw the last observation.
    pub fn clear(&self) -> bool {
        self.tx.send(RealmUpdate::Cleared).is_ok()
    }
}

/// Realm source fed from outside the engine, e.g. a platform detector
/// running on its own thread.
#[derive(Debug)]
pub struct ChannelRealmSource {
    rx: mpsc::UnboundedReceiver<RealmUpdate>,
}

impl ChannelRealmSource {
    pub fn new() -> (RealmPublisher, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RealmPublisher { tx }, Self { rx })
    }
}

impl RealmSignalSource for ChannelRealmSource {
    fn start(
        self: Box<Self>,
        publish: RealmCallback,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let mut rx = self.rx;
        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    update = rx.recv() => {
                        let Some(update) = update else { break };
                        publish(update);
                    }
                }
            }
        }))
    }
}
