//! Start URL validation and normalization.

use anyhow::{bail, Context, Result};

use crate::transport::HopRequest;

/// Maximum URL length (2048 characters), matching common browser and server limits.
const MAX_URL_LENGTH: usize = 2048;

/// Turns the URL given on the command line into the first hop's request.
///
/// Adds an `https://` prefix when the input does not start with a scheme
/// followed by `://`, then requires an http or https URL no longer than
/// `MAX_URL_LENGTH`.
///
/// # Errors
///
/// Returns an error if the URL is too long, does not parse, or uses another scheme.
pub fn parse_start_url(url: &str) -> Result<HopRequest> {
    let url = url.trim();
    let normalized = if has_scheme(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        bail!(
            "URL exceeds maximum length ({} > {}): {}...",
            normalized.len(),
            MAX_URL_LENGTH,
            normalized.get(..50).unwrap_or(&normalized)
        );
    }

    HopRequest::parse_get(&normalized).with_context(|| format!("Invalid URL: {url}"))
}

/// True when `url` opens with `scheme://`, where a scheme is an ASCII letter
/// followed by letters, digits, `+`, `-` or `.`.
fn has_scheme(url: &str) -> bool {
    let Some((scheme, _)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
