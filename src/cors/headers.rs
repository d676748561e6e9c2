//! CORS header constants and response decoration.

use axum::http::{
    header::{ACCESS_CONTROL_ALLOW_ORIGIN, VARY},
    HeaderMap, HeaderValue, Method,
};

use crate::cors::origin::AllowedOrigin;

/// Methods the proxy answers, in the order they are advertised.
pub const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::HEAD, Method::OPTIONS];

/// `ALLOWED_METHODS` joined with `", "`.
pub const ALLOWED_METHODS_LIST: &str = "GET, POST, HEAD, OPTIONS";

/// Preflight cache lifetime in seconds.
pub const MAX_AGE_SECS: &str = "86400";

pub fn allowed_methods_value() -> HeaderValue {
    HeaderValue::from_static(ALLOWED_METHODS_LIST)
}

/// Whether `method` is relayed to the target (every allowed method except `OPTIONS`).
pub fn is_forwardable(method: &Method) -> bool {
    *method != Method::OPTIONS && ALLOWED_METHODS.contains(method)
}

/// Grant `origin` read access to a forwarded response.
///
/// `Access-Control-Allow-Origin` overwrites whatever the target sent and
/// `Origin` is appended to `Vary`.
pub fn decorate(headers: &mut HeaderMap, origin: &AllowedOrigin) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.header_value().clone());
    append_vary(headers, "Origin");
}

/// Append `token` to `Vary`, folding existing values into one
/// comma-separated header.
pub fn append_vary(headers: &mut HeaderMap, token: &str) {
    let mut joined: Vec<u8> = Vec::new();
    for value in headers.get_all(VARY) {
        if value.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.extend_from_slice(b", ");
        }
        joined.extend_from_slice(value.as_bytes());
    }
    if !joined.is_empty() {
        joined.extend_from_slice(b", ");
    }
    joined.extend_from_slice(token.as_bytes());

    match HeaderValue::from_bytes(&joined) {
        Ok(value) => {
            headers.insert(VARY, value);
        }
        Err(_) => {
            // Existing values were valid header bytes, so only an invalid
            // token lands here; keep what the target sent.
            tracing::warn!(token, "Skipped invalid Vary token");
        }
    }
}
