// ── Core error types ──
//
// Errors the engine and its collaborators can report to a caller. None of
// these ever reach the published Mode: the decision path absorbs failures
// and falls back to Default. They surface only through the explicit
// lifecycle and diagnostic APIs (flush, settled, one-shot probes).

use thiserror::Error;

use crate::model::PermissionState;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Engine lifecycle ─────────────────────────────────────────────
    #[error("Decision engine has stopped")]
    EngineStopped,

    // ── Permission ───────────────────────────────────────────────────
    #[error("Location permission unavailable ({status})")]
    PermissionUnavailable { status: PermissionState },

    // ── Probe errors (wrapped, not exposed raw) ──────────────────────
    #[error("Reachability probe timed out after {timeout_ms}ms")]
    ProbeTimeout { timeout_ms: u64 },

    #[error("Probe failed: {message}")]
    ProbeFailed {
        message: String,
        /// HTTP status code, when a response arrived.
        status: Option<u16>,
    },

    #[error("No realm available: {reason}")]
    RealmUnavailable { reason: String },

    // ── Platform ─────────────────────────────────────────────────────
    #[error("Network path unavailable: {message}")]
    PathUnavailable { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<realmwatch_api::Error> for CoreError {
    fn from(err: realmwatch_api::Error) -> Self {
        match err {
            realmwatch_api::Error::Timeout { timeout_ms } => CoreError::ProbeTimeout { timeout_ms },
            realmwatch_api::Error::Transport(ref e) if e.is_timeout() => {
                CoreError::ProbeTimeout { timeout_ms: 0 }
            }
            realmwatch_api::Error::Transport(e) => CoreError::ProbeFailed {
                status: e.status().map(u16::from),
                message: e.to_string(),
            },
            realmwatch_api::Error::BadStatus { status } => CoreError::ProbeFailed {
                message: format!("unexpected HTTP status {status}"),
                status: Some(status),
            },
            realmwatch_api::Error::NoData => CoreError::RealmUnavailable {
                reason: "response carried no realm data".into(),
            },
            realmwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            realmwatch_api::Error::ClientBuild(message) => CoreError::Config { message },
        }
    }
}
