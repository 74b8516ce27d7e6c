use crate::{UrlError, UrlResult};
use url::Url;

/// Normalizes a user-supplied scan target into an absolute URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Bare hosts (`example.com`, `//example.com/page`) get an `https://` scheme
/// 3. Parse the URL; reject if malformed
/// 4. Only `http` and `https` schemes are accepted
/// 5. A host is required
///
/// An explicit `http://` is kept as-is: the HTTPS rule needs to see it.
///
/// # Examples
///
/// ```
/// use sumi_scan::url::normalize_target;
///
/// let url = normalize_target("example.com/about").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
/// ```
pub fn normalize_target(raw: &str) -> UrlResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let candidate = if let Some(rest) = trimmed.strip_prefix("//") {
        format!("https://{}", rest)
    } else if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingHost),
    }
}

/// Returns true if the URL uses the `https` scheme
pub fn is_https(url: &Url) -> bool {
    url.scheme() == "https"
}

/// Builds the `/robots.txt` URL on the same origin as `url`
pub fn robots_url(url: &Url) -> UrlResult<Url> {
    url.join("/robots.txt")
        .map_err(|e| UrlError::Parse(e.to_string()))
}

/// Checks for an explicit `scheme://` prefix
///
/// `Url::parse("example.com:8080")` would read `example.com` as a scheme, so
/// only a `://` separator counts.
fn has_scheme(input: &str) -> bool {
    match input.find("://") {
        Some(idx) => input[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        None => false,
    }
}
