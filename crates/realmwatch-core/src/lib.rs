// realmwatch-core: realm detection and branding mode decisions.
//
// Collaborators (path observer, realm source, permission gate, SSID reader,
// reachability probe) feed a single decision task that publishes a
// `ModeSnapshot` on a watch channel.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod path;
pub mod permission;
pub mod reachability;
pub mod realm;
pub mod ssid;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{EngineConfig, ProbeRealmConfig, TlsVerification};
pub use engine::{ModeEngine, ModeEngineBuilder};
pub use error::CoreError;
pub use model::{
    ConnectivityState, DecisionReason, Mode, ModeSnapshot, PermissionState, RealmUpdate,
};
pub use path::{
    ManualPathObserver, NetworkPathObserver, PathUpdater, PollingPathObserver, manual_path,
};
pub use permission::{NoPrompter, PermissionGate, PermissionPrompter};
pub use reachability::Reachability;
pub use realm::{
    ChannelRealmSource, ProbeRealmSource, RealmPublisher, RealmSignalSource,
    UnavailableRealmSource,
};
pub use ssid::{IwgetidReader, NoSsidReader, SsidReader};
pub use stream::ModeStream;
