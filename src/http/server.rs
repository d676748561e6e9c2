//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create Axum Router with the single proxy handler on every path
//! - Wire up middleware (request ID, tracing, timeout)
//! - Dispatch each request: redirect, preflight, forward, or reject
//! - Serve until the shutdown broadcast fires

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{request_id::SetRequestIdLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ProxyConfig, ValidationError};
use crate::cors::{self, preflight, CorsPolicy};
use crate::http::forward::Forwarder;
use crate::http::request::{MakeRequestUuid, RequestIdExt};
use crate::http::response::{error_response, redirect_response};
use crate::observability::metrics::{self, Outcome};

/// Error type for server construction.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid cors configuration: {0}")]
    Policy(#[from] ValidationError),
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<CorsPolicy>,
    pub forwarder: Forwarder,
}

/// HTTP server for the CORS proxy.
pub struct HttpServer {
    router: Router,
    policy: Arc<CorsPolicy>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let policy = Arc::new(CorsPolicy::from_config(&config.cors)?);
        let state = AppState {
            policy: policy.clone(),
            forwarder: Forwarder::new(&config.upstream, &config.security)?,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, policy })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            allowed_hosts = ?self.policy.allow_list().hosts(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    let (outcome, response) = dispatch(&state, request).await;

    metrics::record_request(method.as_str(), outcome, response.status().as_u16(), start);
    response
}

/// Decide what to do with one request.
///
/// ```text
/// origin invalid       → redirect (no CORS headers)
/// OPTIONS              → preflight responder
/// GET / POST / HEAD    → forwarder
/// anything else        → 405 with Access-Control-Allow-Origin
/// ```
pub async fn dispatch(state: &AppState, request: Request<Body>) -> (Outcome, Response) {
    let request_id = request.request_id().to_owned();

    let Some(origin) = state.policy.check_origin(request.headers()) else {
        tracing::debug!(request_id = %request_id, "Origin not allowed, redirecting");
        return (Outcome::Redirected, redirect_response(state.policy.redirect()));
    };

    if *request.method() == Method::OPTIONS {
        let outcome = if preflight::is_preflight(request.headers()) {
            Outcome::Preflight
        } else {
            Outcome::Options
        };
        return (outcome, preflight::respond(request.headers(), &origin));
    }

    if !cors::is_forwardable(request.method()) {
        tracing::debug!(
            request_id = %request_id,
            method = %request.method(),
            "Method not allowed"
        );
        return (
            Outcome::MethodNotAllowed,
            error_response(StatusCode::METHOD_NOT_ALLOWED, Some(&origin)),
        );
    }

    match state.forwarder.forward(request, &origin).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                origin = %origin.as_str(),
                status = %response.status(),
                "Forwarded"
            );
            (Outcome::Forwarded, response)
        }
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                origin = %origin.as_str(),
                error = %e,
                "Forwarding failed"
            );
            (Outcome::BadRequest, e.into_response_for(&origin))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_REQUEST_HEADERS,
        ACCESS_CONTROL_REQUEST_METHOD, ALLOW, CONTENT_LENGTH, LOCATION, ORIGIN,
    };
    use tower::ServiceExt;

    const ALLOWED: &str = "https://allowed.example";

    fn router() -> Router {
        let mut config = ProxyConfig::default();
        config.cors.allowed_hosts = " allowed.example , localhost".into();
        config.cors.redirect_url = "https://example.com/".into();
        config.upstream.use_system_proxy = false;
        HttpServer::new(config).unwrap().router()
    }

    fn request(method: Method, uri: &str, origin: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(origin) = origin {
            builder = builder.header(ORIGIN, origin);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_is_empty(response: Response) -> bool {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .is_empty()
    }

    #[tokio::test]
    async fn disallowed_origin_redirects_for_every_method() {
        let methods = [
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ];
        for method in methods {
            for origin in [None, Some("https://evil.example"), Some("not a url")] {
                let response = router()
                    .oneshot(request(method.clone(), "/?https%3A%2F%2Fa.example", origin))
                    .await
                    .unwrap();

                assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
                assert_eq!(response.headers()[LOCATION], "https://example.com/");
                assert!(!response.headers().contains_key(ACCESS_CONTROL_ALLOW_ORIGIN));
            }
        }
    }

    #[tokio::test]
    async fn preflight_grants_allowed_origin() {
        let mut req = request(Method::OPTIONS, "/?anything", Some(ALLOWED));
        req.headers_mut()
            .insert(ACCESS_CONTROL_REQUEST_METHOD, "POST".parse().unwrap());
        req.headers_mut()
            .insert(ACCESS_CONTROL_REQUEST_HEADERS, "content-type".parse().unwrap());

        let response = router().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, HEAD, OPTIONS"
        );
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
    }

    #[tokio::test]
    async fn bare_options_lists_methods_only() {
        let mut req = request(Method::OPTIONS, "/", Some(ALLOWED));
        req.headers_mut()
            .insert(ACCESS_CONTROL_REQUEST_METHOD, "GET".parse().unwrap());

        let response = router().oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ALLOW], "GET, POST, HEAD, OPTIONS");
        // axum frames the empty body with `content-length: 0`; hyper drops
        // it on the wire for a 204.
        let others: Vec<_> = response
            .headers()
            .keys()
            .filter(|name| **name != ALLOW && **name != CONTENT_LENGTH)
            .collect();
        assert!(others.is_empty(), "unexpected headers: {others:?}");
        assert!(body_is_empty(response).await);
    }

    #[tokio::test]
    async fn missing_target_is_bad_request_with_origin() {
        for uri in ["/", "/?", "/some/path", "/?%25"] {
            let response = router()
                .oneshot(request(Method::GET, uri, Some(ALLOWED)))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri {uri}");
            assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
        }
    }

    #[tokio::test]
    async fn non_http_target_is_bad_request() {
        let response = router()
            .oneshot(request(
                Method::POST,
                "/?file%3A%2F%2F%2Fetc%2Fpasswd",
                Some("http://localhost:5173"),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn unlisted_method_is_rejected_with_origin() {
        for method in [Method::PUT, Method::DELETE, Method::PATCH] {
            let response = router()
                .oneshot(request(method, "/?https%3A%2F%2Fa.example", Some(ALLOWED)))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED);
        }
    }

    #[test]
    fn invalid_cors_config_fails_construction() {
        let config = ProxyConfig::default();
        assert!(matches!(
            HttpServer::new(config),
            Err(ServerError::Policy(ValidationError::EmptyAllowList))
        ));
    }
}
