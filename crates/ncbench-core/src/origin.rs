//! Backend origin normalization and URL validation.
//!
//! Pure helpers shared by the submitter, the poller and the CLI. They never
//! panic and have no side effects.

use url::Url;

/// Origin used when no backend address is configured.
pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3001";

/// Normalize a configured backend origin.
///
/// Trims whitespace, falls back to [`DEFAULT_ORIGIN`] when empty, strips
/// trailing slashes and then one trailing `/api` segment, so callers can
/// append `/api/...` paths without duplicating the prefix.
pub fn normalize_origin(input: &str) -> String {
    let raw = input.trim();
    if raw.is_empty() {
        return DEFAULT_ORIGIN.to_owned();
    }
    let mut base = raw.trim_end_matches('/');
    if let Some(stripped) = base.strip_suffix("/api") {
        base = stripped;
    }
    base.to_owned()
}

/// True iff `value` parses as an absolute URL with an http or https scheme.
///
/// Parse failures are reported as `false`, never as an error.
pub fn is_valid_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_origin_defaults() {
        assert_eq!(normalize_origin(""), DEFAULT_ORIGIN);
        assert_eq!(normalize_origin("   "), DEFAULT_ORIGIN);
    }

    #[test]
    fn test_origin_strips_slashes_and_api() {
        assert_eq!(normalize_origin("http://h/api/"), "http://h");
        assert_eq!(normalize_origin("http://h/api"), "http://h");
        assert_eq!(normalize_origin("https://bench.example.com///"), "https://bench.example.com");
        assert_eq!(normalize_origin(" http://h "), "http://h");
    }

    #[test]
    fn test_origin_keeps_non_api_paths() {
        assert_eq!(normalize_origin("http://h/backend"), "http://h/backend");
        // Only a trailing `/api` segment is stripped.
        assert_eq!(normalize_origin("http://h/api/v2"), "http://h/api/v2");
    }

    #[test]
    fn test_valid_http_urls() {
        assert!(is_valid_http_url("http://github.com/user/repo.git"));
        assert!(is_valid_http_url("https://github.com/user/repo"));
    }

    #[test]
    fn test_invalid_urls_do_not_error() {
        assert!(!is_valid_http_url(""));
        assert!(!is_valid_http_url("not a url"));
        assert!(!is_valid_http_url("github.com/user/repo"));
        assert!(!is_valid_http_url("ftp://github.com/user/repo"));
        assert!(!is_valid_http_url("file:///etc/passwd"));
    }
}
