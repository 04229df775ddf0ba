// ── Decision state ──
//
// Everything the decision task owns, with no I/O. The task feeds triggers
// and probe completions in arrival order and acts on the returned outcome.
//
// Generations: the counter advances whenever a decision input changes
// (connectivity, stored realm, simulation flag). A probe is tagged with the
// generation it was started for, and its result is applied only while that
// probe is still the one in flight. Any synchronous decision clears the
// in-flight tag, which is what makes late results stale.

use tracing::debug;

use crate::model::{DecisionReason, Mode, ModeSnapshot};

/// An input to the decision algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Trigger {
    Connectivity(bool),
    /// `None` is "no observation", not a clear.
    Realm(Option<String>),
    RealmCleared,
    Resumed,
    Simulated(bool),
}

/// What the task has to do after handling a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The snapshot was decided synchronously.
    Decided,
    /// Start a reachability probe tagged with this generation.
    ProbeStarted(u64),
    /// A probe for the current generation is already running.
    Coalesced,
}

#[derive(Debug)]
pub(crate) struct DecisionState {
    brand: String,
    on_wifi: bool,
    realm: Option<String>,
    simulate_realm: bool,
    generation: u64,
    in_flight: Option<u64>,
    snapshot: ModeSnapshot,
}

impl DecisionState {
    pub(crate) fn new(brand_domain: &str, simulate_realm: bool) -> Self {
        let snapshot = if simulate_realm {
            ModeSnapshot {
                mode: Mode::Branded,
                reason: DecisionReason::SimulatedRealm,
                probe_pending: false,
            }
        } else {
            ModeSnapshot::default()
        };
        Self {
            brand: brand_domain.to_lowercase(),
            on_wifi: false,
            realm: None,
            simulate_realm,
            generation: 0,
            in_flight: None,
            snapshot,
        }
    }

    pub(crate) fn snapshot(&self) -> ModeSnapshot {
        self.snapshot
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn on_wifi(&self) -> bool {
        self.on_wifi
    }

    /// Record the trigger's input, then run the decision algorithm.
    pub(crate) fn handle(&mut self, trigger: Trigger) -> Outcome {
        let changed = match trigger {
            Trigger::Connectivity(on_wifi) => replace(&mut self.on_wifi, on_wifi),
            Trigger::Realm(Some(realm)) => {
                let changed = self.realm.as_deref() != Some(realm.as_str());
                self.realm = Some(realm);
                changed
            }
            Trigger::Realm(None) | Trigger::Resumed => false,
            Trigger::RealmCleared => self.realm.take().is_some(),
            Trigger::Simulated(on) => replace(&mut self.simulate_realm, on),
        };
        if changed {
            self.generation += 1;
        }
        self.evaluate()
    }

    /// Apply a probe result. Returns `false` if the result was stale.
    pub(crate) fn probe_completed(&mut self, generation: u64, reachable: bool) -> bool {
        if self.in_flight != Some(generation) {
            debug!(
                generation,
                current = self.generation,
                "discarding stale probe result"
            );
            return false;
        }
        if reachable {
            self.decide(Mode::Branded, DecisionReason::Reachable);
        } else {
            self.decide(Mode::Default, DecisionReason::Unreachable);
        }
        true
    }

    fn evaluate(&mut self) -> Outcome {
        if self.simulate_realm {
            self.decide(Mode::Branded, DecisionReason::SimulatedRealm);
            return Outcome::Decided;
        }
        if self.realm_matches_brand() {
            self.decide(Mode::Branded, DecisionReason::RealmConfirmed);
            return Outcome::Decided;
        }
        if !self.on_wifi {
            self.decide(Mode::Default, DecisionReason::NotOnWifi);
            return Outcome::Decided;
        }
        if self.in_flight == Some(self.generation) {
            return Outcome::Coalesced;
        }
        self.in_flight = Some(self.generation);
        self.snapshot.probe_pending = true;
        Outcome::ProbeStarted(self.generation)
    }

    fn realm_matches_brand(&self) -> bool {
        !self.brand.is_empty()
            && self
                .realm
                .as_deref()
                .is_some_and(|realm| realm.to_lowercase().contains(&self.brand))
    }

    fn decide(&mut self, mode: Mode, reason: DecisionReason) {
        self.in_flight = None;
        self.snapshot = ModeSnapshot {
            mode,
            reason,
            probe_pending: false,
        };
    }
}

/// Store `value`, returning whether it differed.
fn replace(slot: &mut bool, value: bool) -> bool {
    std::mem::replace(slot, value) != value
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn state() -> DecisionState {
        DecisionState::new("sony.net", false)
    }

    #[test]
    fn off_wifi_decides_default_without_probe() {
        let mut s = state();
        assert_eq!(s.handle(Trigger::Connectivity(false)), Outcome::Decided);
        assert_eq!(s.snapshot().mode, Mode::Default);
        assert_eq!(s.snapshot().reason, DecisionReason::NotOnWifi);
    }

    #[test]
    fn wifi_starts_probe_and_keeps_previous_mode() {
        let mut s = state();
        let outcome = s.handle(Trigger::Connectivity(true));
        assert_eq!(outcome, Outcome::ProbeStarted(1));
        assert_eq!(s.snapshot().mode, Mode::Default);
        assert!(s.snapshot().probe_pending);

        assert!(s.probe_completed(1, true));
        assert_eq!(s.snapshot().mode, Mode::Branded);
        assert_eq!(s.snapshot().reason, DecisionReason::Reachable);
        assert!(!s.snapshot().probe_pending);
    }

    #[test]
    fn back_to_back_wifi_events_coalesce() {
        let mut s = state();
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::ProbeStarted(1));
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::Coalesced);
        assert_eq!(s.handle(Trigger::Resumed), Outcome::Coalesced);
        assert_eq!(s.generation(), 1);
    }

    #[test]
    fn reconfirmation_after_completion_probes_again() {
        let mut s = state();
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::ProbeStarted(1));
        assert!(s.probe_completed(1, false));
        assert_eq!(s.handle(Trigger::Resumed), Outcome::ProbeStarted(1));
    }

    #[test]
    fn leaving_wifi_makes_inflight_result_stale() {
        let mut s = state();
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::ProbeStarted(1));
        assert_eq!(s.handle(Trigger::Connectivity(false)), Outcome::Decided);
        assert!(!s.probe_completed(1, true));
        assert_eq!(s.snapshot().mode, Mode::Default);
        assert_eq!(s.snapshot().reason, DecisionReason::NotOnWifi);
    }

    #[test]
    fn result_for_older_generation_is_discarded_after_reprobe() {
        let mut s = state();
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::ProbeStarted(1));
        s.handle(Trigger::Connectivity(false));
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::ProbeStarted(3));

        assert!(!s.probe_completed(1, true));
        assert!(s.snapshot().probe_pending);
        assert!(s.probe_completed(3, false));
        assert_eq!(s.snapshot().reason, DecisionReason::Unreachable);
    }

    #[test]
    fn brand_realm_dominates_connectivity() {
        let mut s = state();
        s.handle(Trigger::Realm(Some("Passpoint.SONY.NET".into())));
        assert_eq!(s.snapshot().reason, DecisionReason::RealmConfirmed);
        assert_eq!(s.handle(Trigger::Connectivity(false)), Outcome::Decided);
        assert_eq!(s.snapshot().mode, Mode::Branded);
    }

    #[test]
    fn realm_confirmation_fences_pending_probe() {
        let mut s = state();
        assert_eq!(s.handle(Trigger::Connectivity(true)), Outcome::ProbeStarted(1));
        s.handle(Trigger::Realm(Some("sony.net".into())));
        assert!(!s.probe_completed(1, false));
        assert_eq!(s.snapshot().mode, Mode::Branded);
    }

    #[test]
    fn missing_realm_does_not_clear_the_stored_one() {
        let mut s = state();
        s.handle(Trigger::Realm(Some("sony.net".into())));
        let generation = s.generation();
        s.handle(Trigger::Realm(None));
        assert_eq!(s.generation(), generation);
        assert_eq!(s.snapshot().mode, Mode::Branded);

        s.handle(Trigger::RealmCleared);
        assert_eq!(s.snapshot().mode, Mode::Default);
        assert_eq!(s.snapshot().reason, DecisionReason::NotOnWifi);
    }

    #[test]
    fn foreign_realm_does_not_brand() {
        let mut s = state();
        s.handle(Trigger::Connectivity(true));
        assert_eq!(
            s.handle(Trigger::Realm(Some("eduroam.org".into()))),
            Outcome::ProbeStarted(2)
        );
    }

    #[test]
    fn simulation_overrides_everything() {
        let mut s = state();
        s.handle(Trigger::Connectivity(true));
        assert_eq!(s.handle(Trigger::Simulated(true)), Outcome::Decided);
        assert_eq!(s.snapshot().reason, DecisionReason::SimulatedRealm);
        assert!(!s.probe_completed(1, false));

        assert_eq!(s.handle(Trigger::Simulated(false)), Outcome::ProbeStarted(3));
    }

    #[test]
    fn simulated_from_config_starts_branded() {
        let s = DecisionState::new("sony.net", true);
        assert_eq!(s.snapshot().mode, Mode::Branded);
        assert_eq!(s.snapshot().reason, DecisionReason::SimulatedRealm);
    }

    #[test]
    fn empty_brand_never_matches() {
        let mut s = DecisionState::new("", false);
        s.handle(Trigger::Realm(Some("anything".into())));
        assert_eq!(s.snapshot().mode, Mode::Default);
    }
}
