//! Location permission gate.
//!
//! A pure relay of the platform's authorization state. The platform reports
//! changes through [`PermissionGate::report_status`]; consumers read the
//! latest value or subscribe to changes. Requesting access only fires the
//! platform prompt; the outcome arrives later through the same channel.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::error::CoreError;
use crate::model::PermissionState;

/// Platform hook that shows the one-time "allow location access" prompt.
pub trait PermissionPrompter: Send + Sync {
    fn request_when_in_use(&self);
}

/// Prompter for headless hosts: there is no UI to prompt with.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompter;

impl PermissionPrompter for NoPrompter {
    fn request_when_in_use(&self) {
        debug!("no permission prompter installed, request ignored");
    }
}

/// Shared handle to the current permission state.
///
/// Cheaply cloneable; all clones observe the same state.
#[derive(Clone)]
pub struct PermissionGate {
    inner: Arc<GateInner>,
}

struct GateInner {
    status: watch::Sender<PermissionState>,
    prompter: Box<dyn PermissionPrompter>,
}

impl std::fmt::Debug for PermissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGate")
            .field("status", &*self.inner.status.borrow())
            .finish_non_exhaustive()
    }
}

impl Default for PermissionGate {
    fn default() -> Self {
        Self::new(PermissionState::Unknown)
    }
}

impl PermissionGate {
    /// Gate without a platform prompt.
    pub fn new(initial: PermissionState) -> Self {
        Self::with_prompter(initial, NoPrompter)
    }

    pub fn with_prompter(
        initial: PermissionState,
        prompter: impl PermissionPrompter + 'static,
    ) -> Self {
        let (status, _) = watch::channel(initial);
        Self {
            inner: Arc::new(GateInner {
                status,
                prompter: Box::new(prompter),
            }),
        }
    }

    pub fn current_status(&self) -> PermissionState {
        *self.inner.status.borrow()
    }

    pub fn needs_permission_prompt(&self) -> bool {
        self.current_status().needs_prompt()
    }

    /// Fire the platform prompt.
    ///
    /// Platforms only show it while the state is undetermined, so later
    /// calls are dropped here rather than forwarded.
    pub fn request_elevated_access(&self) {
        let status = self.current_status();
        if status == PermissionState::Unknown {
            debug!("requesting when-in-use location access");
            self.inner.prompter.request_when_in_use();
        } else {
            debug!(%status, "permission already determined, not prompting");
        }
    }

    /// Platform callback: the authorization state changed.
    pub fn report_status(&self, status: PermissionState) {
        let changed = self.inner.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            debug!(%status, "permission status changed");
        }
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<PermissionState> {
        self.inner.status.subscribe()
    }

    /// `Ok` when an SSID read may be attempted.
    pub fn require_ssid_access(&self) -> Result<(), CoreError> {
        let status = self.current_status();
        if status.allows_ssid_read() {
            Ok(())
        } else {
            Err(CoreError::PermissionUnavailable { status })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingPrompter(Arc<AtomicUsize>);

    impl PermissionPrompter for CountingPrompter {
        fn request_when_in_use(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn default_gate_is_unknown_and_needs_prompt() {
        let gate = PermissionGate::default();
        assert_eq!(gate.current_status(), PermissionState::Unknown);
        assert!(gate.needs_permission_prompt());
        assert!(matches!(
            gate.require_ssid_access(),
            Err(CoreError::PermissionUnavailable {
                status: PermissionState::Unknown
            })
        ));
    }

    #[test]
    fn prompt_fires_only_while_undetermined() {
        let count = Arc::new(AtomicUsize::new(0));
        let gate = PermissionGate::with_prompter(
            PermissionState::Unknown,
            CountingPrompter(Arc::clone(&count)),
        );

        gate.request_elevated_access();
        assert_eq!(count.load(Ordering::SeqCst), 1);

        gate.report_status(PermissionState::Denied);
        gate.request_elevated_access();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reported_status_reaches_subscribers() {
        let gate = PermissionGate::default();
        let mut rx = gate.subscribe();

        gate.report_status(PermissionState::GrantedWhenInUse);

        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), PermissionState::GrantedWhenInUse);
        assert!(!gate.needs_permission_prompt());
        assert!(gate.require_ssid_access().is_ok());
    }

    #[test]
    fn repeated_status_does_not_notify() {
        let gate = PermissionGate::new(PermissionState::Denied);
        let mut rx = gate.subscribe();
        rx.borrow_and_update();

        gate.report_status(PermissionState::Denied);

        assert!(!rx.has_changed().unwrap_or(true));
    }
}
