//! Shared helpers for building per-service HTTP clients.

use crate::error::ClientError;

/// Validates that `base_url` is non-empty and absolute before any client uses it: an empty
/// base must fail fast with a configuration error rather than being silently stringified into
/// a malformed request path.
pub fn validate_base_url(service: &'static str, base_url: &str) -> Result<String, ClientError> {
    if base_url.trim().is_empty() {
        return Err(ClientError::Config {
            service,
            reason: "base URL is empty".to_string(),
        });
    }
    let parsed = url::Url::parse(base_url).map_err(|e| ClientError::Config {
        service,
        reason: format!("base URL is not a valid URL: {e}"),
    })?;
    if parsed.cannot_be_a_base() {
        return Err(ClientError::Config {
            service,
            reason: "base URL is not absolute".to_string(),
        });
    }
    Ok(base_url.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_base_url() {
        let err = validate_base_url("test", "").unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));
    }

    #[test]
    fn rejects_relative_base_url() {
        let err = validate_base_url("test", "/just/a/path").unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));
    }

    #[test]
    fn accepts_absolute_url_and_trims_trailing_slash() {
        let base = validate_base_url("test", "http://example.com/").unwrap();
        assert_eq!(base, "http://example.com");
    }
}
