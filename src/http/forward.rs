//! Forwarding to the caller-chosen target.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the decoded target URL
//! - Follow redirects on the outbound side
//! - Relay status, headers and the streamed body, then grant the origin
//!
//! # Design Decisions
//! - No retries and no outbound timeout; a failed fetch is a 400 at once
//! - The inbound body is buffered (bounded by `max_body_size`) so the client
//!   can send it with a known length; the response body is streamed

use axum::{
    body::Body,
    http::Request,
    response::Response,
};
use reqwest::redirect::Policy;

use crate::config::{SecurityConfig, UpstreamConfig};
use crate::cors::{self, AllowedOrigin};
use crate::http::response::ForwardError;
use crate::http::target::extract_target;
use crate::security::headers::{outbound_request_headers, strip_hop_by_hop};

/// Outbound side of the proxy. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    max_body_size: usize,
}

impl Forwarder {
    pub fn new(upstream: &UpstreamConfig, security: &SecurityConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().redirect(Policy::limited(upstream.max_redirects));
        if !upstream.use_system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            max_body_size: security.max_body_size,
        })
    }

    /// Relay `request` to the target named in its query string.
    pub async fn forward(
        &self,
        request: Request<Body>,
        origin: &AllowedOrigin,
    ) -> Result<Response, ForwardError> {
        let target = extract_target(request.uri())?;
        let (parts, body) = request.into_parts();

        let body = axum::body::to_bytes(body, self.max_body_size)
            .await
            .map_err(ForwardError::Body)?;

        tracing::debug!(
            method = %parts.method,
            target = %target,
            body_bytes = body.len(),
            "Forwarding request"
        );

        let mut outbound = self
            .client
            .request(parts.method, target)
            .headers(outbound_request_headers(parts.headers));
        if !body.is_empty() {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        cors::decorate(response.headers_mut(), origin);

        Ok(response)
    }
}
