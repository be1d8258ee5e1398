//! Inbound URL sanitization.
//!
//! Runs before the core is invoked: percent-decode, trim, then a strict
//! absolute-URL re-parse restricted to http/https. The core assumes this
//! precondition and performs no further URL validation itself.

use percent_encoding::percent_decode_str;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum UrlRejection {
    #[error("url is not valid percent-encoding / UTF-8")]
    BadEncoding,
    #[error("url does not parse: {0}")]
    Unparseable(String),
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),
    #[error("url has no host")]
    MissingHost,
}

/// Decode, trim, and strictly re-validate a submitted URL.
///
/// Returns the normalized serialization of the parsed URL, the same form
/// the browser's address bar reports, which keeps the later
/// "settled equals input" comparison honest.
pub fn sanitize_url(raw: &str) -> Result<String, UrlRejection> {
    let decoded = percent_decode_str(raw.trim())
        .decode_utf8()
        .map_err(|_| UrlRejection::BadEncoding)?;

    let parsed = Url::parse(decoded.trim()).map_err(|e| UrlRejection::Unparseable(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlRejection::UnsupportedScheme(other.to_string())),
    }
    if parsed.host_str().is_none() {
        return Err(UrlRejection::MissingHost);
    }

    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_absolute_urls() {
        let url = sanitize_url("https://shortener.example/abc123").expect("valid");
        assert_eq!(url, "https://shortener.example/abc123");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let url = sanitize_url("  https://example.com/page \n").expect("valid");
        assert_eq!(url, "https://example.com/page");
    }

    #[test]
    fn percent_decodes_before_validating() {
        let url = sanitize_url("https%3A%2F%2Fexample.com%2Fpage").expect("valid");
        assert_eq!(url, "https://example.com/page");
    }

    #[test]
    fn rejects_missing_protocol() {
        assert!(matches!(
            sanitize_url("example.com/page"),
            Err(UrlRejection::Unparseable(_))
        ));
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(matches!(
            sanitize_url("ftp://files.example/x"),
            Err(UrlRejection::UnsupportedScheme(_))
        ));
        assert!(matches!(
            sanitize_url("javascript:alert(1)"),
            Err(UrlRejection::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(sanitize_url("   ").is_err());
    }
}
