//! Header hygiene for relayed messages.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers in both directions
//! - Drop `Host` and `Content-Length` from outbound requests; the client
//!   derives them from the target URL and the buffered body
//!
//! Everything else passes through verbatim, including headers the target
//! server sets.

use axum::http::{
    header::{
        CONNECTION, CONTENT_LENGTH, HOST, PROXY_AUTHENTICATE, PROXY_AUTHORIZATION, TE, TRAILER,
        TRANSFER_ENCODING, UPGRADE,
    },
    HeaderMap, HeaderName,
};

const KEEP_ALIVE: HeaderName = HeaderName::from_static("keep-alive");
const PROXY_CONNECTION: HeaderName = HeaderName::from_static("proxy-connection");

/// Connection-scoped headers, never relayed.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    // Headers listed in `Connection` are connection-scoped too.
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in listed {
        headers.remove(name);
    }

    for name in [
        CONNECTION,
        KEEP_ALIVE,
        PROXY_CONNECTION,
        PROXY_AUTHENTICATE,
        PROXY_AUTHORIZATION,
        TE,
        TRAILER,
        TRANSFER_ENCODING,
        UPGRADE,
    ] {
        headers.remove(name);
    }
}

/// Prepare inbound headers for the outbound request.
pub fn outbound_request_headers(mut headers: HeaderMap) -> HeaderMap {
    strip_hop_by_hop(&mut headers);
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    headers
}
