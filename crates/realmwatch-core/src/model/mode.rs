// ── Mode domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Branding mode presented to the user.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Stock branding.
    #[default]
    Default,
    /// Branding of the operator whose realm the device is on.
    Branded,
}

impl Mode {
    pub fn is_branded(self) -> bool {
        matches!(self, Self::Branded)
    }
}

/// Why the engine published its current [`Mode`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DecisionReason {
    /// Nothing has been evaluated yet.
    #[default]
    Initial,
    /// The debug override forced branding.
    SimulatedRealm,
    /// A realm observation matched the brand domain.
    RealmConfirmed,
    /// The active interface is not Wi-Fi.
    NotOnWifi,
    /// On Wi-Fi and the reachability endpoint answered.
    Reachable,
    /// On Wi-Fi and the reachability endpoint did not answer.
    Unreachable,
}

/// The value published on the engine's watch channel.
///
/// `probe_pending` is true while a reachability probe for the current
/// trigger generation is outstanding; `mode` keeps its previous value
/// until that probe completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSnapshot {
    pub mode: Mode,
    pub reason: DecisionReason,
    pub probe_pending: bool,
}

/// Whether the active network path uses a Wi-Fi interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityState {
    pub on_wifi: bool,
}

/// An update published by a realm signal source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealmUpdate {
    /// A realm identifier was advertised.
    Observed(String),
    /// The source explicitly withdrew its last observation.
    Cleared,
}
