// Realm source backed by a realm probe server
//
// Polls the server at a fixed interval. A realm is published the first time
// it is seen and again whenever it changes. Fetch failures publish nothing
// and never clear a previous observation.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use realmwatch_api::RealmProbeClient;

use super::{RealmCallback, RealmSignalSource};
use crate::config::ProbeRealmConfig;
use crate::error::CoreError;
use crate::model::RealmUpdate;

/// Polls a realm probe server for the realm identifier.
#[derive(Debug, Clone)]
pub struct ProbeRealmSource {
    client: RealmProbeClient,
    url: Url,
    poll_interval: Duration,
}

impl ProbeRealmSource {
    pub fn new(config: &ProbeRealmConfig) -> Result<Self, CoreError> {
        let client = RealmProbeClient::new(&config.transport())?;
        Ok(Self::with_client(
            client,
            config.url.clone(),
            config.poll_interval,
        ))
    }

    pub fn with_client(client: RealmProbeClient, url: Url, poll_interval: Duration) -> Self {
        Self {
            client,
            url,
            poll_interval,
        }
    }

    /// Fetch once, mapping failures to [`CoreError`].
    pub async fn fetch_once(&self) -> Result<String, CoreError> {
        Ok(self.client.fetch_realm(self.url.as_str()).await?)
    }
}

impl RealmSignalSource for ProbeRealmSource {
    fn start(
        self: Box<Self>,
        publish: RealmCallback,
        cancel: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            let mut last: Option<String> = None;

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let fetched = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = self.client.fetch_realm(self.url.as_str()) => result,
                };

                match fetched {
                    Ok(realm) if last.as_deref() == Some(realm.as_str()) => {}
                    Ok(realm) => {
                        info!(url = %self.url, %realm, "realm observed");
                        last = Some(realm.clone());
                        publish(RealmUpdate::Observed(realm));
                    }
                    Err(e) if e.is_transient() => {
                        debug!(url = %self.url, error = %e, "realm server unreachable");
                    }
                    Err(e) => warn!(url = %self.url, error = %e, "realm fetch failed"),
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn source_for(server: &MockServer) -> ProbeRealmSource {
        let url: Url = format!("{}/realm", server.uri()).parse().expect("url");
        let mut config = ProbeRealmConfig::new(url);
        config.poll_interval = Duration::from_millis(50);
        config.fetch_timeout = Duration::from_secs(2);
        ProbeRealmSource::new(&config).expect("source")
    }

    #[tokio::test]
    async fn fetch_once_reads_plain_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/realm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("sony.net\n"))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        assert_eq!(source.fetch_once().await.expect("realm"), "sony.net");
    }

    #[tokio::test]
    async fn fetch_once_maps_missing_realm() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/realm"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let source = source_for(&server).await;
        assert!(matches!(
            source.fetch_once().await,
            Err(CoreError::RealmUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn polling_publishes_only_changes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/realm"))
            .respond_with(ResponseTemplate::new(200).set_body_string("wlan.sony.net"))
            .up_to_n_times(3)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/realm"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"realm":"other.example"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = Box::new(source_for(&server).await).start(
            Arc::new(move |update| {
                let _ = tx.send(update);
            }),
            cancel.clone(),
        );

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert_eq!(
            first.expect("first update"),
            Some(RealmUpdate::Observed("wlan.sony.net".into()))
        );
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert_eq!(
            second.expect("second update"),
            Some(RealmUpdate::Observed("other.example".into()))
        );

        cancel.cancel();
        if let Some(handle) = handle {
            handle.await.expect("source task");
        }
    }

    #[tokio::test]
    async fn failures_publish_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/realm"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let handle = Box::new(source_for(&server).await).start(
            Arc::new(move |update| {
                let _ = tx.send(update);
            }),
            cancel.clone(),
        );

        let got = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(got.is_err(), "no update expected, got {got:?}");

        cancel.cancel();
        if let Some(handle) = handle {
            handle.await.expect("source task");
        }
    }
}
