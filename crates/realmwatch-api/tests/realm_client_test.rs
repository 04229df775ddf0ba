#![allow(clippy::unwrap_used)]
// Integration tests for `RealmProbeClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use realmwatch_api::{Error, RealmProbeClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RealmProbeClient) {
    let server = MockServer::start().await;
    let client = RealmProbeClient::new(&TransportConfig::with_timeout(Duration::from_secs(4)))
        .unwrap();
    (server, client)
}

async fn serve(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_json_body() {
    let (server, client) = setup().await;
    serve(
        &server,
        "/realm.json",
        ResponseTemplate::new(200).set_body_json(json!({ "realm": "sony.net" })),
    )
    .await;

    let realm = client
        .fetch_realm(&format!("{}/realm.json", server.uri()))
        .await
        .unwrap();
    assert_eq!(realm, "sony.net");
}

#[tokio::test]
async fn test_plaintext_body_is_trimmed() {
    let (server, client) = setup().await;
    serve(
        &server,
        "/realm",
        ResponseTemplate::new(200).set_body_string("sony.net\n"),
    )
    .await;

    let realm = client
        .fetch_realm(&format!("{}/realm", server.uri()))
        .await
        .unwrap();
    assert_eq!(realm, "sony.net");
}

// ── Failures ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_body_is_no_data() {
    let (server, client) = setup().await;
    serve(&server, "/realm", ResponseTemplate::new(200)).await;

    let result = client.fetch_realm(&format!("{}/realm", server.uri())).await;
    assert!(
        matches!(result, Err(Error::NoData)),
        "expected NoData, got: {result:?}"
    );
}

#[tokio::test]
async fn test_invalid_url() {
    let (_server, client) = setup().await;

    let result = client.fetch_realm("not a url").await;
    assert!(
        matches!(result, Err(Error::InvalidUrl(_))),
        "expected InvalidUrl, got: {result:?}"
    );
}

#[tokio::test]
async fn test_not_found_is_bad_status() {
    let (server, client) = setup().await;
    serve(
        &server,
        "/missing",
        ResponseTemplate::new(404).set_body_string("not found\n"),
    )
    .await;

    let result = client.fetch_realm(&format!("{}/missing", server.uri())).await;
    assert!(
        matches!(result, Err(Error::BadStatus { status: 404 })),
        "expected BadStatus(404), got: {result:?}"
    );
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    let client = RealmProbeClient::with_client(reqwest::Client::new(), Duration::from_millis(100));
    serve(
        &server,
        "/realm",
        ResponseTemplate::new(200)
            .set_body_string("sony.net\n")
            .set_delay(Duration::from_millis(800)),
    )
    .await;

    let result = client.fetch_realm(&format!("{}/realm", server.uri())).await;
    assert!(
        matches!(result, Err(Error::Timeout { timeout_ms: 100 })),
        "expected Timeout, got: {result:?}"
    );
}
