//! CLI error types with miette diagnostics.
//!
//! Maps core, config, and transport errors into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use realmwatch_config::ConfigError;
use realmwatch_core::{CoreError, PermissionState};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Network ──────────────────────────────────────────────────────
    #[error("{url} is not reachable: {reason}")]
    #[diagnostic(
        code(realmwatch::unreachable),
        help(
            "The endpoint did not answer with a status in 200..400.\n\
             Check connectivity, or try --insecure for self-signed certificates."
        )
    )]
    Unreachable { url: String, reason: String },

    #[error("Request to {url} failed")]
    #[diagnostic(
        code(realmwatch::connection_failed),
        help("Check that the server is running and accessible.")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{url} answered with HTTP {status}")]
    #[diagnostic(code(realmwatch::bad_status))]
    BadStatus { url: String, status: u16 },

    #[error("Request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(realmwatch::timeout),
        help("Increase the timeout with --timeout-ms or check the endpoint.")
    )]
    Timeout { timeout_ms: u64 },

    #[error("{url} did not return a realm")]
    #[diagnostic(
        code(realmwatch::no_realm),
        help("Expected {{\"realm\":\"...\"}} or a plain-text realm in the response body.")
    )]
    NoRealm { url: String },

    // ── Engine ───────────────────────────────────────────────────────
    #[error("Location permission unavailable ({status})")]
    #[diagnostic(
        code(realmwatch::permission),
        help("Set [permission] initial = \"granted-when-in-use\" to allow SSID reads.")
    )]
    PermissionUnavailable { status: PermissionState },

    #[error("Decision engine stopped unexpectedly")]
    #[diagnostic(code(realmwatch::engine_stopped))]
    EngineStopped,

    #[error("Network path unavailable: {message}")]
    #[diagnostic(
        code(realmwatch::path),
        help("Pass --wifi true|false to skip interface detection.")
    )]
    PathUnavailable { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(realmwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(realmwatch::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(realmwatch::config),
        help("Check the config file and REALMWATCH_* environment variables.")
    )]
    Config(Box<figment::Error>),

    #[error("Failed to serialize config: {0}")]
    #[diagnostic(code(realmwatch::config))]
    Serialization(#[from] toml::ser::Error),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    #[diagnostic(code(realmwatch::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::ConnectionFailed { .. } | Self::BadStatus { .. } => {
                exit_code::CONNECTION
            }
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoRealm { .. } => exit_code::NOT_FOUND,
            Self::PermissionUnavailable { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::ConfigExists { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Map a transport error, attributing it to `url`.
    pub fn from_api(err: realmwatch_api::Error, url: &str) -> Self {
        match err {
            realmwatch_api::Error::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            realmwatch_api::Error::BadStatus { status } => Self::BadStatus {
                url: url.into(),
                status,
            },
            realmwatch_api::Error::NoData => Self::NoRealm { url: url.into() },
            realmwatch_api::Error::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: format!("{url}: {e}"),
            },
            realmwatch_api::Error::ClientBuild(reason) => Self::Validation {
                field: "tls".into(),
                reason,
            },
            realmwatch_api::Error::Transport(e) => Self::ConnectionFailed {
                url: url.into(),
                source: Box::new(e),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Serialization(e) => Self::Serialization(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EngineStopped => Self::EngineStopped,
            CoreError::PermissionUnavailable { status } => Self::PermissionUnavailable { status },
            CoreError::ProbeTimeout { timeout_ms } => Self::Timeout { timeout_ms },
            CoreError::ProbeFailed {
                status: Some(status),
                ..
            } => Self::BadStatus {
                url: "(probe)".into(),
                status,
            },
            CoreError::ProbeFailed {
                message,
                status: None,
            } => Self::ConnectionFailed {
                url: "(probe)".into(),
                source: message.into(),
            },
            CoreError::RealmUnavailable { .. } => Self::NoRealm {
                url: "(realm source)".into(),
            },
            CoreError::PathUnavailable { message } => Self::PathUnavailable { message },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let unreachable = CliError::Unreachable {
            url: "https://acloudradius.net/".into(),
            reason: "HTTP 503".into(),
        };
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);
        assert_eq!(CliError::Timeout { timeout_ms: 5 }.exit_code(), exit_code::TIMEOUT);
        assert_eq!(
            CliError::NoRealm { url: "x".into() }.exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(CliError::EngineStopped.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "engine.brand_domain".into(),
            reason: "must not be empty".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn api_no_data_names_the_url() {
        let err = CliError::from_api(realmwatch_api::Error::NoData, "http://127.0.0.1/realm");
        assert!(err.to_string().contains("http://127.0.0.1/realm"));
    }
}
