//! Configuration for the realmwatch tools.
//!
//! Layers, lowest to highest: built-in defaults, the TOML file,
//! `REALMWATCH_`-prefixed environment variables (`__` separates sections),
//! and the bare `REALM` / `PORT` variables understood by every realm probe
//! server. The result is translated into `realmwatch_core` runtime types;
//! core never sees the TOML structs.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use realmwatch_core::{EngineConfig, PermissionState, ProbeRealmConfig, TlsVerification};

/// Realm served when neither the file nor `REALM` sets one.
pub const DEFAULT_SERVER_REALM: &str = "sony.net";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub realm_source: RealmSourceSection,

    #[serde(default)]
    pub path: PathSection,

    #[serde(default)]
    pub permission: PermissionSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// `[engine]`: how the mode is decided.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineSection {
    /// Realm substring that selects branded mode.
    #[serde(default = "default_brand_domain")]
    pub brand_domain: String,

    /// Endpoint for the reachability HEAD probe.
    #[serde(default = "default_reachability_url")]
    pub reachability_url: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    /// Start with the debug override engaged.
    #[serde(default)]
    pub simulate_realm: bool,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification for the reachability probe.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            brand_domain: default_brand_domain(),
            reachability_url: default_reachability_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
            simulate_realm: false,
            ca_cert: None,
            insecure: false,
        }
    }
}

fn default_brand_domain() -> String {
    realmwatch_core::config::DEFAULT_BRAND_DOMAIN.into()
}
fn default_reachability_url() -> String {
    realmwatch_core::config::DEFAULT_REACHABILITY_URL.into()
}
fn default_probe_timeout_ms() -> u64 {
    5000
}

/// Which realm source feeds the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RealmSourceKind {
    /// No realm telemetry; rely on the reachability heuristic.
    #[default]
    Unavailable,
    /// Poll a realm probe server.
    Probe,
}

/// `[realm_source]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RealmSourceSection {
    #[serde(default)]
    pub kind: RealmSourceKind,

    /// Realm endpoint, required when `kind = "probe"`.
    pub url: Option<String>,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for RealmSourceSection {
    fn default() -> Self {
        Self {
            kind: RealmSourceKind::default(),
            url: None,
            poll_interval_secs: default_poll_interval_secs(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            ca_cert: None,
            insecure: false,
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    30
}
fn default_fetch_timeout_ms() -> u64 {
    4000
}

/// `[path]`: network path sampling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathSection {
    #[serde(default = "default_path_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for PathSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_path_poll_interval_ms(),
        }
    }
}

fn default_path_poll_interval_ms() -> u64 {
    2000
}

/// `[permission]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PermissionSection {
    /// Location permission state the gate starts in.
    #[serde(default)]
    pub initial: PermissionState,
}

/// `[server]`: the realm probe server run by `realmwatch serve`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerSection {
    #[serde(default = "default_server_realm")]
    pub realm: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    #[serde(default = "default_server_bind")]
    pub bind: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            realm: default_server_realm(),
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

fn default_server_realm() -> String {
    DEFAULT_SERVER_REALM.into()
}
fn default_server_port() -> u16 {
    DEFAULT_SERVER_PORT
}
fn default_server_bind() -> String {
    "0.0.0.0".into()
}

/// Resolved probe server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub realm: String,
    pub bind: IpAddr,
    pub port: u16,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "acloudradius", "realmwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("realmwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Defaults plus the TOML file at `path` (missing files are skipped).
pub fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// All layers: defaults, file, `REALMWATCH_*`, then `REALM` / `PORT`.
pub fn figment(path: &Path) -> Figment {
    let figment = file_figment(path)
        .merge(Env::prefixed("REALMWATCH_").split("__"))
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()));

    // REALM is taken verbatim: `1234` or `true` are realms, not scalars.
    match std::env::var("REALM") {
        Ok(realm) => figment.merge(Serialized::default("server.realm", realm)),
        Err(_) => figment,
    }
}

/// Load and validate the config at `path`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment(path).extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Validation & translation ────────────────────────────────────────

impl Config {
    /// Check everything the translations below rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_config()?;
        self.probe_realm_config()?;
        self.server_config()?;
        if self.path.poll_interval_ms == 0 {
            return Err(invalid("path.poll_interval_ms", "must be greater than zero"));
        }
        Ok(())
    }

    /// Build the engine's runtime configuration.
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let engine = &self.engine;
        let brand_domain = engine.brand_domain.trim();
        if brand_domain.is_empty() {
            return Err(invalid("engine.brand_domain", "must not be empty"));
        }
        let reachability_url = parse_http_url("engine.reachability_url", &engine.reachability_url)?;
        if engine.probe_timeout_ms == 0 {
            return Err(invalid("engine.probe_timeout_ms", "must be greater than zero"));
        }

        Ok(EngineConfig {
            brand_domain: brand_domain.to_owned(),
            reachability_url,
            probe_timeout: Duration::from_millis(engine.probe_timeout_ms),
            tls: tls_verification(engine.insecure, engine.ca_cert.as_ref()),
            simulate_realm: engine.simulate_realm,
        })
    }

    /// Realm probe polling settings, or `None` when no source is configured.
    pub fn probe_realm_config(&self) -> Result<Option<ProbeRealmConfig>, ConfigError> {
        let section = &self.realm_source;
        match section.kind {
            RealmSourceKind::Unavailable => Ok(None),
            RealmSourceKind::Probe => {
                let raw = section.url.as_deref().ok_or_else(|| {
                    invalid("realm_source.url", "required when kind = \"probe\"")
                })?;
                let url = parse_http_url("realm_source.url", raw)?;
                if section.poll_interval_secs == 0 {
                    return Err(invalid(
                        "realm_source.poll_interval_secs",
                        "must be greater than zero",
                    ));
                }
                if section.fetch_timeout_ms == 0 {
                    return Err(invalid(
                        "realm_source.fetch_timeout_ms",
                        "must be greater than zero",
                    ));
                }
                Ok(Some(ProbeRealmConfig {
                    url,
                    poll_interval: Duration::from_secs(section.poll_interval_secs),
                    fetch_timeout: Duration::from_millis(section.fetch_timeout_ms),
                    tls: tls_verification(section.insecure, section.ca_cert.as_ref()),
                }))
            }
        }
    }

    /// Sampling period for the polling path observer.
    pub fn path_poll_interval(&self) -> Duration {
        Duration::from_millis(self.path.poll_interval_ms)
    }

    pub fn initial_permission(&self) -> PermissionState {
        self.permission.initial
    }

    /// Probe server settings. An empty realm falls back to the default.
    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let realm = match self.server.realm.trim() {
            "" => DEFAULT_SERVER_REALM.to_owned(),
            realm => realm.to_owned(),
        };
        let bind = self.server.bind.parse().map_err(|_| {
            invalid("server.bind", format!("not an IP address: {}", self.server.bind))
        })?;
        Ok(ServerConfig {
            realm,
            bind,
            port: self.server.port,
        })
    }
}

fn parse_http_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw
        .parse()
        .map_err(|e| invalid(field, format!("invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(field, format!("unsupported scheme '{other}'"))),
    }
}

fn tls_verification(insecure: bool, ca_cert: Option<&PathBuf>) -> TlsVerification {
    if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(path) = ca_cert {
        TlsVerification::CustomCa(path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}
