use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `realmwatch-api` crate.
///
/// Covers every failure mode of the two HTTP surfaces: the reachability
/// probe and the realm probe client. The decision engine collapses all of
/// these into `reachable = false` or "no update"; the CLI surfaces them.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded its timeout bound.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The HTTP client could not be constructed (TLS material, builder error).
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Response ────────────────────────────────────────────────────
    /// A response arrived but its status is outside the accepted range.
    #[error("Unexpected HTTP status {status}")]
    BadStatus { status: u16 },

    /// The response body was empty or carried no usable realm.
    #[error("Response carried no realm data")]
    NoData,
}

impl Error {
    /// Classify a `reqwest` send failure, turning timeouts into [`Error::Timeout`].
    pub(crate) fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            Self::Transport(err)
        }
    }

    /// Returns `true` if the request ran out of time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth re-probing later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// The HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadStatus { status } => Some(*status),
            Self::Transport(e) => e.status().map(u16::from),
            _ => None,
        }
    }
}
