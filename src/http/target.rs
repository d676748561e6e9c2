//! Target URL extraction.
//!
//! Callers address the proxy as `https://proxy/?<encoded-target-url>`, and
//! the value after `?` is percent-encoded twice. It is decoded exactly twice
//! with `decodeURIComponent` semantics: `+` stays a plus sign, and a stray
//! `%` or a non-UTF-8 byte sequence fails the request.

use std::borrow::Cow;

use axum::http::Uri;
use percent_encoding::percent_decode_str;
use url::Url;

use crate::http::response::ForwardError;

/// Read the target URL out of the inbound request URI.
pub fn extract_target(uri: &Uri) -> Result<Url, ForwardError> {
    let query = uri.query().unwrap_or_default();
    let decoded = decode_component(&decode_component(query)?)?;

    if decoded.is_empty() {
        return Err(ForwardError::MissingTarget);
    }

    let url = Url::parse(&decoded)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ForwardError::UnsupportedScheme(other.to_string())),
    }
}

fn decode_component(input: &str) -> Result<String, ForwardError> {
    if !has_valid_escapes(input) {
        return Err(ForwardError::Undecodable);
    }
    percent_decode_str(input)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ForwardError::Undecodable)
}

/// Every `%` must start a two-digit hex escape.
fn has_valid_escapes(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(uri: &'static str) -> Result<Url, ForwardError> {
        extract_target(&Uri::from_static(uri))
    }

    #[test]
    fn decodes_single_encoded_target() {
        let url = target("/?https%3A%2F%2Fapi.example.com%2Fdata").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/data");
    }

    #[test]
    fn decodes_double_encoded_target() {
        let url = target("/?https%253A%252F%252Fapi.example.com%252Fsearch%253Fq%253Da%252526b").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/search?q=a%26b");
    }

    #[test]
    fn plus_is_not_a_space() {
        let url = target("/?https%3A%2F%2Fapi.example.com%2F%3Fq%3Da%2Bb").unwrap();
        assert_eq!(url.query(), Some("q=a+b"));
    }

    #[test]
    fn path_is_ignored() {
        let url = target("/some/path?http%3A%2F%2Fexample.com%2F").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn absent_or_empty_query_is_missing() {
        assert!(matches!(target("/"), Err(ForwardError::MissingTarget)));
        assert!(matches!(target("/?"), Err(ForwardError::MissingTarget)));
    }

    #[test]
    fn malformed_escapes_fail() {
        assert!(matches!(target("/?%zz"), Err(ForwardError::Undecodable)));
        // "%25" becomes a lone "%" on the first pass.
        assert!(matches!(target("/?%25"), Err(ForwardError::Undecodable)));
        assert!(matches!(target("/?%FF"), Err(ForwardError::Undecodable)));
    }

    #[test]
    fn non_http_targets_are_rejected() {
        assert!(matches!(
            target("/?ftp%3A%2F%2Fexample.com%2F"),
            Err(ForwardError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            target("/?not-a-url"),
            Err(ForwardError::InvalidTarget(_))
        ));
    }
}
