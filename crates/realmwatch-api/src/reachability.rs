//! Reachability heuristic: a bounded HEAD request against a fixed origin.
//!
//! Stands in for realm telemetry that the platform does not expose. The
//! result is deliberately coarse: any transport failure, timeout, or status
//! outside `[200, 400)` counts as unreachable. There are no retries; the
//! engine re-probes on the next qualifying event instead.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Origin probed when no override is configured.
pub const DEFAULT_REACHABILITY_URL: &str = "https://acloudradius.net";

/// Upper bound on a single reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Single-shot reachability check against one endpoint.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl ReachabilityProbe {
    /// Create a probe from a `TransportConfig`.
    ///
    /// Redirects are never followed, whatever the transport says.
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = TransportConfig {
            follow_redirects: false,
            ..transport.clone()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            endpoint,
            timeout: transport.timeout,
        })
    }

    /// Create a probe with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, endpoint: Url, timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            timeout,
        }
    }

    /// The probed endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The per-request timeout bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue the HEAD request and report the accepted status, or why not.
    pub async fn check(&self) -> Result<StatusCode, Error> {
        debug!("HEAD {}", self.endpoint);

        let resp = self
            .http
            .head(self.endpoint.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;

        let status = resp.status();
        if is_reachable_status(status) {
            Ok(status)
        } else {
            Err(Error::BadStatus {
                status: status.as_u16(),
            })
        }
    }

    /// Collapse [`check`](Self::check) into the boolean heuristic.
    pub async fn is_reachable(&self) -> bool {
        match self.check().await {
            Ok(status) => {
                debug!(endpoint = %self.endpoint, %status, "reachability probe succeeded");
                true
            }
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "reachability probe failed");
                false
            }
        }
    }
}

/// `[200, 400)`: success and redirect codes prove the origin answered.
pub fn is_reachable_status(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}
