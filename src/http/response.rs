//! Responses the proxy produces itself.
//!
//! # Responsibilities
//! - Redirect disallowed origins without explanation
//! - Empty-bodied error responses that still carry
//!   `Access-Control-Allow-Origin`, so the browser can read the status
//! - Map forwarding failures to 400 Bad Request
//!
//! # Design Decisions
//! - Every bad-request cause collapses to the same status and headers;
//!   the cause is only logged

use axum::http::{
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, LOCATION},
    StatusCode,
};
use axum::response::{IntoResponse, Response};

use crate::cors::{AllowedOrigin, RedirectTarget};

/// Why a request could not be forwarded.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("no target url in query string")]
    MissingTarget,
    #[error("target url is not valid percent-encoding")]
    Undecodable,
    #[error("invalid target url: {0}")]
    InvalidTarget(#[from] url::ParseError),
    #[error("unsupported target scheme {0:?}")]
    UnsupportedScheme(String),
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl ForwardError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn into_response_for(self, origin: &AllowedOrigin) -> Response {
        error_response(self.status(), Some(origin))
    }
}

/// Empty response with `status`, granting `origin` when one was validated.
pub fn error_response(status: StatusCode, origin: Option<&AllowedOrigin>) -> Response {
    let mut response = status.into_response();
    if let Some(origin) = origin {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.header_value().clone());
    }
    response
}

/// Redirect to the fallback location. No CORS headers, no body.
pub fn redirect_response(target: &RedirectTarget) -> Response {
    let mut response = target.status.into_response();
    response
        .headers_mut()
        .insert(LOCATION, target.location.clone());
    response
}
