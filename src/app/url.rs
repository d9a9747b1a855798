//! Target URL normalization and host helpers.

use log::warn;

use crate::error_handling::ScanError;

/// Maximum URL length (2048 characters), matching common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Normalizes a scan target.
///
/// Adds an `http://` prefix when the target carries no `http://` or `https://`
/// scheme (compared case-insensitively), so a scheme is never prepended twice.
/// The result must parse as an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns `ScanError::InvalidUrl` if the target is empty, too long, or does
/// not parse as an http(s) URL after normalization.
pub fn normalize_target_url(target: &str) -> Result<String, ScanError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidUrl("empty target".to_string()));
    }

    let normalized = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Rejecting target exceeding maximum length ({} > {})",
            normalized.len(),
            MAX_URL_LENGTH
        );
        return Err(ScanError::InvalidUrl(format!(
            "URL longer than {MAX_URL_LENGTH} characters"
        )));
    }

    match url::Url::parse(&normalized) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some() => {
            Ok(normalized)
        }
        Ok(parsed) => Err(ScanError::InvalidUrl(format!(
            "unsupported URL: {}",
            parsed.as_str()
        ))),
        Err(e) => Err(ScanError::InvalidUrl(format!("{trimmed}: {e}"))),
    }
}

fn has_http_scheme(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Extracts the lowercase host of a URL, without port.
pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.trim_end_matches('.').to_ascii_lowercase())
}

/// Returns `true` if the URL uses the `https` scheme.
pub fn is_https(url: &str) -> bool {
    url::Url::parse(url)
        .map(|u| u.scheme() == "https")
        .unwrap_or(false)
}
