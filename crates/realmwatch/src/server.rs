//! Realm probe HTTP server.
//!
//! `GET /realm` answers with the realm as text, `GET /realm.json` with
//! `{"realm": "..."}`, `/` and `/health` with `ok`. Everything else is a
//! plain-text 404.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;

use realmwatch_config::ServerConfig;

use crate::error::CliError;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json; charset=utf-8";

#[derive(Clone)]
struct ProbeState {
    realm: Arc<str>,
}

#[derive(Serialize)]
struct RealmBody<'a> {
    realm: &'a str,
}

/// Routes of the probe server, advertising `realm`.
pub fn router(realm: &str) -> Router {
    Router::new()
        .route("/realm", any(realm_text))
        .route("/realm.json", any(realm_json))
        .route("/", any(health))
        .route("/health", any(health))
        .fallback(not_found)
        .with_state(ProbeState {
            realm: Arc::from(realm),
        })
}

/// Bind the configured address and serve until `shutdown` resolves.
pub async fn run(
    config: &ServerConfig,
    quiet: bool,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CliError> {
    let listener = TcpListener::bind(SocketAddr::new(config.bind, config.port)).await?;
    serve(listener, &config.realm, quiet, shutdown).await
}

/// Serve on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    realm: &str,
    quiet: bool,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CliError> {
    let addr = listener.local_addr()?;
    info!(port = addr.port(), %realm, "realm probe listening");
    if !quiet {
        eprintln!("realm probe listening on :{} (realm={realm})", addr.port());
    }

    axum::serve(listener, router(realm))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("realm probe stopped");
    Ok(())
}

async fn realm_text(State(state): State<ProbeState>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], format!("{}\n", state.realm))
}

async fn realm_json(State(state): State<ProbeState>) -> Response {
    match serde_json::to_string(&RealmBody {
        realm: &state.realm,
    }) {
        Ok(body) => ([(header::CONTENT_TYPE, APPLICATION_JSON)], body).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            format!("{e}\n"),
        )
            .into_response(),
    }
}

async fn health() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], "ok\n")
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, TEXT_PLAIN)],
        "not found\n",
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tokio::sync::oneshot;

    use super::*;

    struct Running {
        base: String,
        stop: oneshot::Sender<()>,
        task: tokio::task::JoinHandle<Result<(), CliError>>,
    }

    async fn start(realm: &str) -> Running {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let (stop, stopped) = oneshot::channel::<()>();
        let realm = realm.to_owned();
        let task = tokio::spawn(async move {
            serve(listener, &realm, true, async {
                let _ = stopped.await;
            })
            .await
        });
        Running { base, stop, task }
    }

    impl Running {
        async fn get(&self, path: &str) -> reqwest::Response {
            reqwest::get(format!("{}{path}", self.base)).await.unwrap()
        }

        async fn stop(self) {
            let _ = self.stop.send(());
            self.task.await.unwrap().unwrap();
        }
    }

    fn content_type(resp: &reqwest::Response) -> String {
        resp.headers()[reqwest::header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .to_owned()
    }

    #[tokio::test]
    async fn realm_is_served_as_text() {
        let server = start("sony.net").await;
        let resp = server.get("/realm").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(content_type(&resp), TEXT_PLAIN);
        assert_eq!(resp.text().await.unwrap(), "sony.net\n");
        server.stop().await;
    }

    #[tokio::test]
    async fn realm_is_served_as_json() {
        let server = start("sony.net").await;
        let resp = server.get("/realm.json").await;
        assert_eq!(resp.status(), 200);
        assert_eq!(content_type(&resp), APPLICATION_JSON);
        assert_eq!(resp.text().await.unwrap(), r#"{"realm":"sony.net"}"#);
        server.stop().await;
    }

    #[tokio::test]
    async fn json_escapes_the_realm() {
        let server = start(r#"odd"realm"#).await;
        let body = server.get("/realm.json").await.text().await.unwrap();
        assert_eq!(body, r#"{"realm":"odd\"realm"}"#);
        server.stop().await;
    }

    #[tokio::test]
    async fn root_and_health_report_ok() {
        let server = start("sony.net").await;
        for path in ["/", "/health"] {
            let resp = server.get(path).await;
            assert_eq!(resp.status(), 200, "{path}");
            assert_eq!(resp.text().await.unwrap(), "ok\n");
        }
        server.stop().await;
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let server = start("sony.net").await;
        let resp = server.get("/unknown").await;
        assert_eq!(resp.status(), 404);
        assert_eq!(content_type(&resp), TEXT_PLAIN);
        assert_eq!(resp.text().await.unwrap(), "not found\n");
        server.stop().await;
    }
}
