//! CORS preflight handling.
//!
//! See <https://developer.mozilla.org/en-US/docs/Glossary/Preflight_request>.

use axum::http::{
    header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD,
        ALLOW, ORIGIN,
    },
    HeaderMap, HeaderValue, StatusCode,
};
use axum::response::{IntoResponse, Response};

use crate::cors::headers::{allowed_methods_value, MAX_AGE_SECS};
use crate::cors::origin::AllowedOrigin;

/// A request is a full preflight when it carries `Origin`,
/// `Access-Control-Request-Method` and `Access-Control-Request-Headers`.
pub fn is_preflight(headers: &HeaderMap) -> bool {
    headers.contains_key(ORIGIN)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
        && headers.contains_key(ACCESS_CONTROL_REQUEST_HEADERS)
}

/// Answer an `OPTIONS` request from an allowed origin.
///
/// A full preflight gets the CORS grant; anything else gets a bare `Allow`
/// listing, which is capability discovery and not a grant.
pub fn respond(headers: &HeaderMap, origin: &AllowedOrigin) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let out = response.headers_mut();

    match headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
        Some(requested) if is_preflight(headers) => {
            out.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            out.insert(ACCESS_CONTROL_ALLOW_METHODS, allowed_methods_value());
            out.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.header_value().clone());
            out.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
        }
        _ => {
            out.insert(ALLOW, allowed_methods_value());
        }
    }

    response
}
