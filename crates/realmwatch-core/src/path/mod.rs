// ── Network path observation ──
//
// Observers report whether the active network path uses Wi-Fi. They call
// back on every update, including reconfirmations of the same state; the
// engine decides what counts as a change.

mod manual;
mod polling;

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub use manual::{ManualPathObserver, PathUpdater, manual_path};
pub use polling::{PollingPathObserver, default_route_is_wifi};

/// Callback invoked with `on_wifi` on every path update.
pub type PathCallback = Arc<dyn Fn(bool) + Send + Sync>;

/// A source of network path updates.
///
/// `observe` consumes the observer and starts a background watch that runs
/// until `cancel` fires. Returns the task handle, if a task was spawned.
pub trait NetworkPathObserver: Send + 'static {
    fn observe(
        self: Box<Self>,
        on_change: PathCallback,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>>;
}
