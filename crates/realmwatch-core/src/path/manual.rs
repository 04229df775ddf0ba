// Channel-driven path observer
//
// For hosts that receive interface-type changes from somewhere else (an OS
// callback, a test) and only need to forward them.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{NetworkPathObserver, PathCallback};

/// Sending half: report the current interface type.
#[derive(Debug, Clone)]
pub struct PathUpdater {
    tx: mpsc::UnboundedSender<bool>,
}

impl PathUpdater {
    /// Report a path update. Returns `false` once the observer is gone.
    pub fn report(&self, on_wifi: bool) -> bool {
        self.tx.send(on_wifi).is_ok()
    }
}

/// Receiving half, handed to the engine.
#[derive(Debug)]
pub struct ManualPathObserver {
    rx: mpsc::UnboundedReceiver<bool>,
}

/// Create a connected updater / observer pair.
pub fn manual_path() -> (PathUpdater, ManualPathObserver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PathUpdater { tx }, ManualPathObserver { rx })
}

impl NetworkPathObserver for ManualPathObserver {
    fn observe(
        self: Box<Self>,
        on_change: PathCallback,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        let mut rx = self.rx;
        Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    update = rx.recv() => {
                        let Some(on_wifi) = update else { break };
                        on_change(on_wifi);
                    }
                }
            }
        }))
    }
}
