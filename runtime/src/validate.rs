// Copyright 2026 Pagetext Contributors
// SPDX-License-Identifier: Apache-2.0

//! Absolute URL validation. Runs before any browser work is started.

use crate::error::ExtractError;
use url::Url;

/// Parse `raw` and require both a scheme and a host.
pub fn validate_url(raw: &str) -> Result<Url, ExtractError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ExtractError::InvalidUrl(format!("{trimmed:?}: {e}")))?;

    if url.scheme().is_empty() {
        return Err(ExtractError::InvalidUrl(format!("{trimmed:?}: missing scheme")));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(ExtractError::InvalidUrl(format!("{trimmed:?}: missing host"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_absolute_urls() {
        let url = validate_url("https://example.com/a?b=c").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert!(validate_url("http://127.0.0.1:8080/").is_ok());
        assert!(validate_url("  https://example.com  ").is_ok());
    }

    #[test]
    fn test_rejects_missing_scheme() {
        for raw in ["not-a-url", "example.com/page", "//example.com", ""] {
            let err = validate_url(raw).unwrap_err();
            assert!(matches!(err, ExtractError::InvalidUrl(_)), "{raw}");
        }
    }

    #[test]
    fn test_rejects_missing_host() {
        for raw in ["mailto:someone@example.com", "data:text/html,<p>x</p>", "file:///etc/hosts"] {
            let err = validate_url(raw).unwrap_err();
            assert!(err.to_string().contains("invalid URL"), "{raw}");
        }
    }
}
