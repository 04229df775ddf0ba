// ── Reachability seam ──
//
// The engine only needs a yes/no answer. Production uses the HTTP probe
// from realmwatch-api; tests substitute their own.

use std::future::Future;

use realmwatch_api::ReachabilityProbe;

/// Single-shot reachability check.
///
/// Failures of any kind must resolve to `false`.
pub trait Reachability: Send + Sync + 'static {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send;
}

impl Reachability for ReachabilityProbe {
    fn is_reachable(&self) -> impl Future<Output = bool> + Send {
        ReachabilityProbe::is_reachable(self)
    }
}
