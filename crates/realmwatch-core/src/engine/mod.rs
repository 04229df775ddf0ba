// ── Mode decision engine ──
//
// One task owns the decision state and consumes an unbounded event queue.
// Handlers, observer callbacks, and probe completions all enqueue events, so
// decisions happen in arrival order on a single writer. Only probe tasks
// suspend; they report back through the same queue.

mod state;

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use realmwatch_api::ReachabilityProbe;

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::model::{ConnectivityState, Mode, ModeSnapshot, PermissionState, RealmUpdate};
use crate::path::NetworkPathObserver;
use crate::permission::PermissionGate;
use crate::reachability::Reachability;
use crate::realm::{RealmSignalSource, UnavailableRealmSource};
use crate::ssid::{NoSsidReader, SsidReader};
use crate::stream::ModeStream;

use self::state::{DecisionState, Outcome, Trigger};

#[derive(Debug)]
enum EngineEvent {
    Trigger(Trigger),
    ProbeCompleted { generation: u64, reachable: bool },
    /// Barrier: acknowledged once every earlier event was processed.
    Flush(oneshot::Sender<()>),
}

// ── ModeEngine ───────────────────────────────────────────────────

/// Handle to a running decision engine.
///
/// Cheaply cloneable. Dropping the last handle cancels the background
/// tasks; [`shutdown`](Self::shutdown) also waits for them.
#[derive(Clone)]
pub struct ModeEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    snapshot_rx: watch::Receiver<ModeSnapshot>,
    connectivity_rx: watch::Receiver<ConnectivityState>,
    prompt_rx: watch::Receiver<bool>,
    permission: PermissionGate,
    ssid_reader: Box<dyn SsidReader>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for ModeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeEngine")
            .field("snapshot", &*self.inner.snapshot_rx.borrow())
            .field("permission", &self.inner.permission)
            .finish_non_exhaustive()
    }
}

impl ModeEngine {
    /// Start configuring an engine around a reachability probe.
    pub fn builder<P: Reachability>(config: EngineConfig, probe: P) -> ModeEngineBuilder<P> {
        ModeEngineBuilder {
            config,
            probe,
            path_observer: None,
            realm_source: Box::new(UnavailableRealmSource),
            permission: PermissionGate::default(),
            ssid_reader: Box::new(NoSsidReader),
        }
    }

    /// Builder using the HTTP HEAD probe described by `config`.
    pub fn with_http_probe(
        config: EngineConfig,
    ) -> Result<ModeEngineBuilder<ReachabilityProbe>, CoreError> {
        let probe = ReachabilityProbe::new(config.reachability_url.clone(), &config.transport())?;
        Ok(Self::builder(config, probe))
    }

    // ── Handlers ─────────────────────────────────────────────────

    /// The active interface changed (or was reconfirmed).
    pub fn on_connectivity_changed(&self, on_wifi: bool) {
        debug!(on_wifi, "connectivity changed");
        self.dispatch(Trigger::Connectivity(on_wifi));
    }

    /// A realm source reported. `None` keeps the last known realm.
    pub fn on_realm_observed(&self, realm: Option<String>) {
        debug!(realm = ?realm, "realm observed");
        self.dispatch(Trigger::Realm(realm));
    }

    /// A realm source withdrew its last observation.
    pub fn clear_realm(&self) {
        debug!("realm cleared");
        self.dispatch(Trigger::RealmCleared);
    }

    /// Re-evaluate without new input, e.g. when the app returns to the
    /// foreground.
    pub fn on_activity_resumed(&self) {
        debug!("activity resumed");
        self.dispatch(Trigger::Resumed);
    }

    /// Debug override: `true` forces Branded until turned off again.
    pub fn set_simulated_realm_detected(&self, on: bool) {
        debug!(on, "simulated realm toggled");
        self.dispatch(Trigger::Simulated(on));
    }

    // ── Published state ──────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.inner.snapshot_rx.borrow().mode
    }

    pub fn snapshot(&self) -> ModeSnapshot {
        *self.inner.snapshot_rx.borrow()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> ModeStream {
        ModeStream::new(self.inner.snapshot_rx.clone())
    }

    pub fn connectivity(&self) -> watch::Receiver<ConnectivityState> {
        self.inner.connectivity_rx.clone()
    }

    /// Whether the location-permission affordance should be shown.
    pub fn requires_permission_prompt(&self) -> watch::Receiver<bool> {
        self.inner.prompt_rx.clone()
    }

    pub fn permission(&self) -> &PermissionGate {
        &self.inner.permission
    }

    /// Fire the platform's location prompt, if it can still be shown.
    pub fn request_location_permission(&self) {
        self.inner.permission.request_elevated_access();
    }

    /// SSID of the current network, if permission allows reading it.
    pub fn current_ssid(&self) -> Option<String> {
        if let Err(e) = self.inner.permission.require_ssid_access() {
            debug!(error = %e, "not reading SSID");
            return None;
        }
        self.inner.ssid_reader.current_ssid()
    }

    /// Human-readable description of the active network path.
    pub fn connectivity_description(&self) -> String {
        if !self.inner.connectivity_rx.borrow().on_wifi {
            return "On Cellular/Other".into();
        }
        match self.current_ssid() {
            Some(ssid) => format!("On Wi-Fi ({ssid})"),
            None => "On Wi-Fi".into(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Resolve once every event sent before this call has been processed.
    pub async fn flush(&self) -> Result<(), CoreError> {
        let (tx, rx) = oneshot::channel();
        self.send(EngineEvent::Flush(tx))?;
        rx.await.map_err(|_| CoreError::EngineStopped)
    }

    /// Flush, then wait until no probe is pending. Returns the settled mode.
    pub async fn settled(&self) -> Result<Mode, CoreError> {
        self.flush().await?;
        let mut rx = self.inner.snapshot_rx.clone();
        let snapshot = rx
            .wait_for(|s| !s.probe_pending)
            .await
            .map_err(|_| CoreError::EngineStopped)?;
        Ok(snapshot.mode)
    }

    /// Cancel all background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        info!("mode engine stopped");
    }

    fn dispatch(&self, trigger: Trigger) {
        if self.send(EngineEvent::Trigger(trigger)).is_err() {
            debug!("engine stopped, event dropped");
        }
    }

    fn send(&self, event: EngineEvent) -> Result<(), CoreError> {
        self.inner
            .event_tx
            .send(event)
            .map_err(|_| CoreError::EngineStopped)
    }
}

// ── Builder ──────────────────────────────────────────────────────

/// Collects collaborators before the engine starts.
///
/// Defaults: no path observer (push connectivity through the handle), an
/// unavailable realm source, a permission gate in `Unknown`, and no SSID
/// reader.
pub struct ModeEngineBuilder<P> {
    config: EngineConfig,
    probe: P,
    path_observer: Option<Box<dyn NetworkPathObserver>>,
    realm_source: Box<dyn RealmSignalSource>,
    permission: PermissionGate,
    ssid_reader: Box<dyn SsidReader>,
}

impl<P: Reachability> ModeEngineBuilder<P> {
    pub fn path_observer(mut self, observer: impl NetworkPathObserver) -> Self {
        self.path_observer = Some(Box::new(observer));
        self
    }

    pub fn realm_source(mut self, source: impl RealmSignalSource) -> Self {
        self.realm_source = Box::new(source);
        self
    }

    pub fn permission_gate(mut self, gate: PermissionGate) -> Self {
        self.permission = gate;
        self
    }

    pub fn ssid_reader(mut self, reader: impl SsidReader + 'static) -> Self {
        self.ssid_reader = Box::new(reader);
        self
    }

    /// Start the decision task and the collaborators.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> ModeEngine {
        let Self {
            config,
            probe,
            path_observer,
            realm_source,
            permission,
            ssid_reader,
        } = self;

        let cancel = CancellationToken::new();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = DecisionState::new(&config.brand_domain, config.simulate_realm);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (connectivity_tx, connectivity_rx) = watch::channel(ConnectivityState::default());
        let mut status_rx = permission.subscribe();
        let needs_prompt = status_rx.borrow_and_update().needs_prompt();
        let (prompt_tx, prompt_rx) = watch::channel(needs_prompt);

        let mut handles = Vec::new();

        handles.push(tokio::spawn(decision_task(
            state,
            event_rx,
            DecisionOutputs {
                event_tx: event_tx.clone(),
                probe: Arc::new(probe),
                snapshot_tx,
                connectivity_tx,
            },
            cancel.clone(),
        )));

        handles.push(tokio::spawn(permission_relay_task(
            status_rx,
            prompt_tx,
            cancel.clone(),
        )));

        if let Some(observer) = path_observer {
            let tx = event_tx.clone();
            let on_change = Arc::new(move |on_wifi: bool| {
                let _ = tx.send(EngineEvent::Trigger(Trigger::Connectivity(on_wifi)));
            });
            handles.extend(observer.observe(on_change, cancel.clone()));
        }

        let tx = event_tx.clone();
        let publish = Arc::new(move |update: RealmUpdate| {
            let trigger = match update {
                RealmUpdate::Observed(realm) => Trigger::Realm(Some(realm)),
                RealmUpdate::Cleared => Trigger::RealmCleared,
            };
            let _ = tx.send(EngineEvent::Trigger(trigger));
        });
        handles.extend(realm_source.start(publish, cancel.clone()));

        info!(
            brand = %config.brand_domain,
            endpoint = %config.reachability_url,
            simulate_realm = config.simulate_realm,
            "mode engine started"
        );

        ModeEngine {
            inner: Arc::new(EngineInner {
                event_tx,
                snapshot_rx,
                connectivity_rx,
                prompt_rx,
                permission,
                ssid_reader,
                cancel,
                task_handles: Mutex::new(handles),
            }),
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

struct DecisionOutputs<P> {
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    probe: Arc<P>,
    snapshot_tx: watch::Sender<ModeSnapshot>,
    connectivity_tx: watch::Sender<ConnectivityState>,
}

async fn decision_task<P: Reachability>(
    mut state: DecisionState,
    mut rx: mpsc::UnboundedReceiver<EngineEvent>,
    out: DecisionOutputs<P>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = rx.recv() => {
                let Some(event) = event else { break };
                event
            }
        };

        match event {
            EngineEvent::Trigger(trigger) => {
                match state.handle(trigger) {
                    Outcome::Decided => {}
                    Outcome::ProbeStarted(generation) => {
                        debug!(generation, "starting reachability probe");
                        spawn_probe(&out, generation, &cancel);
                    }
                    Outcome::Coalesced => {
                        debug!(
                            generation = state.generation(),
                            "probe already in flight, coalescing"
                        );
                    }
                }
                let on_wifi = state.on_wifi();
                out.connectivity_tx.send_if_modified(|current| {
                    let changed = current.on_wifi != on_wifi;
                    current.on_wifi = on_wifi;
                    changed
                });
            }
            EngineEvent::ProbeCompleted {
                generation,
                reachable,
            } => {
                if state.probe_completed(generation, reachable) {
                    debug!(generation, reachable, "probe result applied");
                }
            }
            EngineEvent::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        }

        publish(&out.snapshot_tx, state.snapshot());
    }
}

fn spawn_probe<P: Reachability>(
    out: &DecisionOutputs<P>,
    generation: u64,
    cancel: &CancellationToken,
) {
    let probe = Arc::clone(&out.probe);
    let tx = out.event_tx.clone();
    let cancel = cancel.clone();
    tokio::spawn(async move {
        let reachable = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            reachable = probe.is_reachable() => reachable,
        };
        let _ = tx.send(EngineEvent::ProbeCompleted {
            generation,
            reachable,
        });
    });
}

fn publish(tx: &watch::Sender<ModeSnapshot>, next: ModeSnapshot) {
    let mut previous = None;
    let changed = tx.send_if_modified(|current| {
        if *current == next {
            return false;
        }
        previous = Some(current.mode);
        *current = next;
        true
    });
    if changed && previous != Some(next.mode) {
        info!(mode = %next.mode, reason = %next.reason, "mode changed");
    }
}

/// Mirror the gate's state into the `requires_permission_prompt` channel.
async fn permission_relay_task(
    mut status_rx: watch::Receiver<PermissionState>,
    prompt_tx: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let needs_prompt = status_rx.borrow_and_update().needs_prompt();
                prompt_tx.send_if_modified(|current| {
                    let changed = *current != needs_prompt;
                    *current = needs_prompt;
                    changed
                });
            }
        }
    }
}
