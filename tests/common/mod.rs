//! Shared utilities for integration testing.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Router,
};
use cors_proxy::config::ProxyConfig;
use cors_proxy::{HttpServer, Shutdown};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

#[allow(dead_code)]
pub const ALLOWED_ORIGIN: &str = "https://allowed.example";
#[allow(dead_code)]
pub const REDIRECT_URL: &str = "https://example.com/";

/// Start a mock target server on an ephemeral port.
///
/// - `GET /data`: `{"ok":true}` with `Vary: Accept`
/// - `POST /echo`: echoes the body and the `x-test` header, status 201
/// - `GET /redirect`: 307 to `/data`
/// - `GET /loop`: 307 to itself
/// - `GET /wildcard`: sets `Access-Control-Allow-Origin: *`
/// - `GET /teapot`: 418 with `x-upstream: yes`
pub async fn start_mock_backend() -> SocketAddr {
    let app = Router::new()
        .route(
            "/data",
            get(|| async {
                (
                    [
                        (header::VARY, "Accept"),
                        (header::CONTENT_TYPE, "application/json"),
                    ],
                    r#"{"ok":true}"#,
                )
            }),
        )
        .route(
            "/echo",
            post(|headers: HeaderMap, body: Bytes| async move {
                let echoed = headers
                    .get("x-test")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("missing")
                    .to_string();
                (StatusCode::CREATED, [("x-echo-header", echoed)], body)
            }),
        )
        .route("/redirect", get(|| async { Redirect::temporary("/data") }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route(
            "/wildcard",
            get(|| async { ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], "open") }),
        )
        .route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, [("x-upstream", "yes")]).into_response() }),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A running proxy.
#[allow(dead_code)]
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestProxy {
    /// URL that relays to `target`, encoded once.
    pub fn url_for(&self, target: &str) -> String {
        format!("http://{}/?{}", self.addr, encode(target))
    }
}

/// Start the proxy on an ephemeral port, allowing `allowed.example` and `localhost`.
pub async fn start_proxy() -> TestProxy {
    start_proxy_with(|_| {}).await
}

/// Like [`start_proxy`], with `customize` applied to the config first.
pub async fn start_proxy_with(customize: impl FnOnce(&mut ProxyConfig)) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.cors.allowed_hosts = "allowed.example, localhost".into();
    config.cors.redirect_url = REDIRECT_URL.into();
    config.upstream.use_system_proxy = false;
    customize(&mut config);

    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, receiver).await });

    TestProxy {
        addr,
        shutdown,
        handle,
    }
}

pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// A client that neither uses system proxies nor follows redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
