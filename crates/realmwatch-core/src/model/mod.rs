// ── Domain model ──
//
// Value types shared by the engine, its collaborators, and consumers.

pub mod mode;
pub mod permission;

pub use mode::{ConnectivityState, DecisionReason, Mode, ModeSnapshot, RealmUpdate};
pub use permission::PermissionState;
