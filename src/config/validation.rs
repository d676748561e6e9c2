//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - The allow-list must name at least one host
//! - The redirect target must be usable as a `Location` header
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::{Host, Url};

use crate::config::schema::ProxyConfig;
use crate::cors::AllowList;

/// Redirect statuses a Fetch `Response.redirect` accepts.
pub const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("cors.allowed_hosts must list at least one hostname")]
    EmptyAllowList,
    #[error("cors.redirect_url is required")]
    MissingRedirectUrl,
    #[error("cors.redirect_url {0:?} is not a valid absolute URL")]
    InvalidRedirectUrl(String),
    #[error("cors.redirect_status {0} is not a redirect status (301, 302, 303, 307, 308)")]
    InvalidRedirectStatus(u16),
    #[error("{field} {value:?} is not a host:port address")]
    InvalidAddress { field: &'static str, value: String },
    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
    #[error("observability.log_level {0:?} is not a known level")]
    UnknownLogLevel(String),
}

/// `ip:port` or `host:port`, the forms `TcpListener::bind` resolves.
fn is_bind_address(value: &str) -> bool {
    if value.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match value.rsplit_once(':') {
        Some((host, port)) => port.parse::<u16>().is_ok() && Host::parse(host).is_ok(),
        None => false,
    }
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if AllowList::parse(&config.cors.allowed_hosts).is_empty() {
        errors.push(ValidationError::EmptyAllowList);
    }

    let redirect = config.cors.redirect_url.trim();
    if redirect.is_empty() {
        errors.push(ValidationError::MissingRedirectUrl);
    } else if Url::parse(redirect).is_err() || HeaderValue::from_str(redirect).is_err() {
        errors.push(ValidationError::InvalidRedirectUrl(redirect.to_string()));
    }

    if !REDIRECT_STATUSES.contains(&config.cors.redirect_status) {
        errors.push(ValidationError::InvalidRedirectStatus(
            config.cors.redirect_status,
        ));
    }

    if !is_bind_address(&config.listener.bind_address) {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
