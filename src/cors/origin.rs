//! Origin validation against the static allow-list.

use axum::http::HeaderValue;
use url::Url;

/// Hostnames accepted as CORS origins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    hosts: Vec<String>,
}

impl AllowList {
    /// Parse a comma-separated host list. Entries are trimmed and empty
    /// entries dropped, so `"a.example, ,b.example,"` holds two hosts.
    pub fn parse(raw: &str) -> Self {
        let hosts = raw
            .split(',')
            .map(str::trim)
            .filter(|host| !host.is_empty())
            .map(str::to_owned)
            .collect();
        Self { hosts }
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|allowed| allowed == host)
    }

    /// Check a raw `Origin` header. Absent, non-ASCII, unparseable or
    /// host-less origins are all invalid.
    pub fn validate(&self, origin: Option<&HeaderValue>) -> Option<AllowedOrigin> {
        let value = origin?;
        let url = Url::parse(value.to_str().ok()?).ok()?;
        let host = url.host_str()?;

        self.contains(host).then(|| AllowedOrigin(value.clone()))
    }
}

/// An `Origin` header value that passed the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedOrigin(HeaderValue);

impl AllowedOrigin {
    /// The value to echo in `Access-Control-Allow-Origin`.
    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only constructed from values that passed `to_str`.
        self.0.to_str().unwrap_or_default()
    }
}
