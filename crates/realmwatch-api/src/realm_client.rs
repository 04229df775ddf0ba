// Realm probe client
//
// Fetches the realm string advertised by a realm probe server. Accepts
// either `{"realm": "..."}` or a plain-text body; JSON wins when both
// interpretations are possible.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default bound on a realm fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Deserialize)]
struct RealmBody {
    realm: String,
}

/// HTTP client for the realm probe server.
#[derive(Debug, Clone)]
pub struct RealmProbeClient {
    http: reqwest::Client,
    timeout: Duration,
}

impl RealmProbeClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// The per-request timeout bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and extract the realm from the response body.
    pub async fn fetch_realm(&self, url: &str) -> Result<String, Error> {
        let url = Url::parse(url)?;
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::from_request(e, self.timeout))?;
        parse_realm_body(&body)
    }
}

/// Extract a realm from a probe response body.
///
/// JSON object with a non-empty string `realm` field first, then the body as
/// trimmed UTF-8 text. Anything else is [`Error::NoData`].
pub fn parse_realm_body(body: &[u8]) -> Result<String, Error> {
    if body.is_empty() {
        return Err(Error::NoData);
    }

    if let Ok(RealmBody { realm }) = serde_json::from_slice::<RealmBody>(body) {
        if !realm.is_empty() {
            return Ok(realm);
        }
    }

    match std::str::from_utf8(body).map(str::trim) {
        Ok(text) if !text.is_empty() => Ok(text.to_owned()),
        _ => Err(Error::NoData),
    }
}
