//! The process-wide CORS policy.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use url::Url;

use crate::config::validation::REDIRECT_STATUSES;
use crate::config::{CorsConfig, ValidationError};
use crate::cors::origin::{AllowList, AllowedOrigin};

/// Where disallowed callers are sent.
#[derive(Debug, Clone)]
pub struct RedirectTarget {
    pub location: HeaderValue,
    pub status: StatusCode,
}

/// Allow-list and redirect target, fixed at startup and shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_list: AllowList,
    redirect: RedirectTarget,
}

impl CorsPolicy {
    pub fn new(allow_list: AllowList, redirect: RedirectTarget) -> Self {
        Self {
            allow_list,
            redirect,
        }
    }

    /// Build the policy from an already validated config section.
    pub fn from_config(config: &CorsConfig) -> Result<Self, ValidationError> {
        let allow_list = AllowList::parse(&config.allowed_hosts);
        if allow_list.is_empty() {
            return Err(ValidationError::EmptyAllowList);
        }

        let raw = config.redirect_url.trim();
        let invalid = || ValidationError::InvalidRedirectUrl(raw.to_string());
        // Serialized form, so `https://example.com` redirects to `https://example.com/`.
        let url = Url::parse(raw).map_err(|_| invalid())?;
        let location = HeaderValue::from_str(url.as_str()).map_err(|_| invalid())?;
        let status = StatusCode::from_u16(config.redirect_status)
            .ok()
            .filter(|status| REDIRECT_STATUSES.contains(&status.as_u16()))
            .ok_or(ValidationError::InvalidRedirectStatus(config.redirect_status))?;

        Ok(Self::new(allow_list, RedirectTarget { location, status }))
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub fn redirect(&self) -> &RedirectTarget {
        &self.redirect
    }

    /// Validate the `Origin` header of an inbound request.
    pub fn check_origin(&self, headers: &HeaderMap) -> Option<AllowedOrigin> {
        self.allow_list.validate(headers.get(axum::http::header::ORIGIN))
    }
}
