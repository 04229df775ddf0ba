//! Shared helpers for command handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;
use url::Url;

use realmwatch_config::{Config, config_path};
use realmwatch_core::{
    EngineConfig, IwgetidReader, ModeEngine, ModeEngineBuilder, PermissionGate,
    TlsVerification, path::default_route_is_wifi,
};
use realmwatch_api::ReachabilityProbe;

use crate::cli::{DecisionArgs, GlobalOpts};
use crate::error::CliError;

/// Config file selected by `--config`, or the platform default.
pub fn resolve_config_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Parse an http(s) URL given on the command line.
pub fn parse_url(field: &str, raw: &str) -> Result<Url, CliError> {
    let url: Url = raw.parse().map_err(|e| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CliError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

/// A `--timeout-ms` override, rejecting zero.
pub fn timeout_override(timeout_ms: Option<u64>) -> Result<Option<Duration>, CliError> {
    match timeout_ms {
        Some(0) => Err(CliError::Validation {
            field: "timeout-ms".into(),
            reason: "must be greater than zero".into(),
        }),
        other => Ok(other.map(Duration::from_millis)),
    }
}

pub fn tls_override(tls: TlsVerification, insecure: bool) -> TlsVerification {
    if insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        tls
    }
}

/// Engine config from the file, with the `--simulate` override applied.
pub fn engine_config(config: &Config, args: &DecisionArgs) -> Result<EngineConfig, CliError> {
    let mut engine = config.engine_config()?;
    if args.simulate {
        engine.simulate_realm = true;
    }
    Ok(engine)
}

/// Engine builder with the HTTP probe, the configured permission gate,
/// and an `iwgetid` SSID reader.
pub fn engine_builder(
    engine: EngineConfig,
    config: &Config,
) -> Result<ModeEngineBuilder<ReachabilityProbe>, CliError> {
    Ok(ModeEngine::with_http_probe(engine)?
        .permission_gate(PermissionGate::new(config.initial_permission()))
        .ssid_reader(IwgetidReader::default()))
}

/// Whether the default route uses Wi-Fi. Unknown counts as "not on Wi-Fi".
pub fn detect_wifi() -> bool {
    match default_route_is_wifi(Path::new("/")) {
        Ok(on_wifi) => on_wifi,
        Err(e) => {
            warn!(error = %e, "cannot detect network path, assuming not on Wi-Fi");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_url_rejects_other_schemes() {
        assert!(parse_url("url", "https://acloudradius.net").is_ok());
        assert!(matches!(
            parse_url("url", "file:///etc/passwd"),
            Err(CliError::Validation { .. })
        ));
        assert!(matches!(
            parse_url("url", "not a url"),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(timeout_override(Some(0)).is_err());
        assert_eq!(
            timeout_override(Some(250)).ok().flatten(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(timeout_override(None).ok().flatten(), None);
    }

    #[test]
    fn insecure_flag_overrides_configured_tls() {
        assert_eq!(
            tls_override(TlsVerification::SystemDefaults, true),
            TlsVerification::DangerAcceptInvalid
        );
        assert_eq!(
            tls_override(TlsVerification::SystemDefaults, false),
            TlsVerification::SystemDefaults
        );
    }
}
