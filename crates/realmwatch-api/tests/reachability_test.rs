#![allow(clippy::unwrap_used)]
// Integration tests for `ReachabilityProbe` using wiremock.

use std::time::Duration;

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use realmwatch_api::{Error, ReachabilityProbe, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(timeout: Duration) -> (MockServer, ReachabilityProbe) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&server.uri()).unwrap();
    let probe = ReachabilityProbe::new(endpoint, &TransportConfig::with_timeout(timeout)).unwrap();
    (server, probe)
}

async fn respond_with(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(template)
        .mount(server)
        .await;
}

// ── Status range ────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_200_is_reachable() {
    let (server, probe) = setup(Duration::from_secs(5)).await;
    respond_with(&server, ResponseTemplate::new(200)).await;

    assert!(probe.is_reachable().await);
}

#[tokio::test]
async fn test_status_399_is_reachable() {
    let (server, probe) = setup(Duration::from_secs(5)).await;
    respond_with(&server, ResponseTemplate::new(399)).await;

    assert_eq!(probe.check().await.unwrap().as_u16(), 399);
    assert!(probe.is_reachable().await);
}

#[tokio::test]
async fn test_redirect_is_reachable_without_following() {
    let (server, probe) = setup(Duration::from_secs(5)).await;
    respond_with(
        &server,
        ResponseTemplate::new(301).insert_header("Location", "http://127.0.0.1:9/elsewhere"),
    )
    .await;

    assert_eq!(probe.check().await.unwrap().as_u16(), 301);
}

#[tokio::test]
async fn test_status_400_is_unreachable() {
    let (server, probe) = setup(Duration::from_secs(5)).await;
    respond_with(&server, ResponseTemplate::new(400)).await;

    let result = probe.check().await;
    assert!(
        matches!(result, Err(Error::BadStatus { status: 400 })),
        "expected BadStatus(400), got: {result:?}"
    );
    assert!(!probe.is_reachable().await);
}

#[tokio::test]
async fn test_server_error_is_unreachable() {
    let (server, probe) = setup(Duration::from_secs(5)).await;
    respond_with(&server, ResponseTemplate::new(503)).await;

    assert!(!probe.is_reachable().await);
}

// ── Failure modes ───────────────────────────────────────────────────

#[tokio::test]
async fn test_slow_response_times_out() {
    let (server, probe) = setup(Duration::from_millis(100)).await;
    respond_with(
        &server,
        ResponseTemplate::new(200).set_delay(Duration::from_millis(800)),
    )
    .await;

    let result = probe.check().await;
    assert!(
        matches!(result, Err(ref e) if e.is_timeout()),
        "expected timeout, got: {result:?}"
    );
    assert!(!probe.is_reachable().await);
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let endpoint = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
    let probe =
        ReachabilityProbe::with_client(reqwest::Client::new(), endpoint, Duration::from_secs(2));

    let result = probe.check().await;
    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected transport error, got: {result:?}"
    );
    assert!(!probe.is_reachable().await);
}

#[tokio::test]
async fn test_probe_uses_head_not_get() {
    let (server, probe) = setup(Duration::from_secs(5)).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    respond_with(&server, ResponseTemplate::new(204)).await;

    assert!(probe.is_reachable().await);
}
