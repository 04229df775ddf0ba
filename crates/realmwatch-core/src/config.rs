// ── Runtime engine configuration ──
//
// These types describe how the engine decides and how its HTTP
// collaborators behave. They never touch disk: the CLI constructs them
// (usually through realmwatch-config) and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use realmwatch_api::{TlsMode, TransportConfig};

pub use realmwatch_api::{DEFAULT_FETCH_TIMEOUT, DEFAULT_PROBE_TIMEOUT, DEFAULT_REACHABILITY_URL};

/// Brand domain matched against realm observations.
pub const DEFAULT_BRAND_DOMAIN: &str = "sony.net";

/// How often a [`ProbeRealmSource`](crate::realm::ProbeRealmSource) polls.
pub const DEFAULT_REALM_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// How often a [`PollingPathObserver`](crate::path::PollingPathObserver) samples.
pub const DEFAULT_PATH_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default: the reachability origin is public.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed probe servers).
    DangerAcceptInvalid,
}

/// Configuration for the mode decision engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Substring that marks a realm as belonging to the brand (case-insensitive).
    pub brand_domain: String,
    /// Endpoint hit by the reachability heuristic.
    pub reachability_url: Url,
    /// Bound on a single reachability probe.
    pub probe_timeout: Duration,
    /// TLS verification for the reachability probe.
    pub tls: TlsVerification,
    /// Start with the debug override engaged (forces Branded).
    pub simulate_realm: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            brand_domain: DEFAULT_BRAND_DOMAIN.into(),
            reachability_url: DEFAULT_REACHABILITY_URL
                .parse()
                .expect("default reachability URL is valid"),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            tls: TlsVerification::default(),
            simulate_realm: false,
        }
    }
}

impl EngineConfig {
    /// Transport settings for the reachability probe.
    pub fn transport(&self) -> TransportConfig {
        build_transport(&self.tls, self.probe_timeout)
    }
}

/// Configuration for polling a realm probe server.
#[derive(Debug, Clone)]
pub struct ProbeRealmConfig {
    /// Full URL of the realm endpoint (`/realm` or `/realm.json`).
    pub url: Url,
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
    pub tls: TlsVerification,
}

impl ProbeRealmConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            poll_interval: DEFAULT_REALM_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            tls: TlsVerification::default(),
        }
    }

    /// Transport settings for the realm fetch client.
    pub fn transport(&self) -> TransportConfig {
        build_transport(&self.tls, self.fetch_timeout)
    }
}

/// Build a [`TransportConfig`] from core TLS settings and a timeout.
pub(crate) fn build_transport(tls: &TlsVerification, timeout: Duration) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(tls),
        timeout,
        ..TransportConfig::default()
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.brand_domain, "sony.net");
        assert_eq!(cfg.reachability_url.as_str(), "https://acloudradius.net/");
        assert_eq!(cfg.probe_timeout, Duration::from_secs(5));
        assert!(!cfg.simulate_realm);
    }

    #[test]
    fn transport_carries_tls_and_timeout() {
        let cfg = EngineConfig {
            tls: TlsVerification::DangerAcceptInvalid,
            probe_timeout: Duration::from_millis(750),
            ..EngineConfig::default()
        };
        let transport = cfg.transport();
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(transport.timeout, Duration::from_millis(750));
    }
}
