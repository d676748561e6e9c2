//! Metrics collection and exposition.
//!
//! # Metrics
//! - `cors_proxy_requests_total` (counter): requests by method, outcome, status
//! - `cors_proxy_request_duration_seconds` (histogram): latency by outcome

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How the dispatcher disposed of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Origin not allowed; sent to the redirect target.
    Redirected,
    /// Full CORS preflight answered.
    Preflight,
    /// `OPTIONS` without preflight headers; `Allow` listing only.
    Options,
    /// Relayed to the target.
    Forwarded,
    BadRequest,
    MethodNotAllowed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Redirected => "redirected",
            Outcome::Preflight => "preflight",
            Outcome::Options => "options",
            Outcome::Forwarded => "forwarded",
            Outcome::BadRequest => "bad_request",
            Outcome::MethodNotAllowed => "method_not_allowed",
        }
    }
}

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, outcome: Outcome, status: u16, start: Instant) {
    ::metrics::counter!(
        "cors_proxy_requests_total",
        "method" => method.to_owned(),
        "outcome" => outcome.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "cors_proxy_request_duration_seconds",
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
