use url::Url;

/// Validates a referrer candidate to prevent open redirects.
///
/// Returns `Some(url)` if the candidate is a safe relative path or an
/// absolute URL on the same origin as `base_url`, `None` otherwise.
///
/// # Security
///
/// Relative paths must:
/// - Start with a single `/` (protocol-relative URLs like `//evil.com` or
///   `/\evil.com` are rejected)
/// - Resolve against `base_url` to the same origin
/// - Not contain control characters (potential injection)
/// - Not contain `://` (embedded absolute URLs)
///
/// Absolute URLs must share scheme, host and port with `base_url`.
///
/// # Examples
///
/// ```
/// use auth0_sample_core::auth::validate_referrer;
/// use url::Url;
///
/// let base = Url::parse("https://app.example.com").unwrap();
///
/// assert_eq!(validate_referrer("/account", &base).as_deref(), Some("/account"));
/// assert_eq!(
///     validate_referrer("https://app.example.com/account", &base).as_deref(),
///     Some("https://app.example.com/account")
/// );
/// assert_eq!(validate_referrer("//evil.com", &base), None);
/// assert_eq!(validate_referrer("https://evil.com", &base), None);
/// ```
pub fn validate_referrer(candidate: &str, base_url: &Url) -> Option<String> {
    if candidate.chars().any(|c| c.is_control()) {
        return None;
    }

    if candidate.starts_with('/') {
        // Browsers read `/\host` like `//host`.
        if candidate.starts_with("//")
            || candidate.starts_with("/\\")
            || candidate.contains("://")
        {
            return None;
        }
        let resolved = base_url.join(candidate).ok()?;
        return (resolved.origin() == base_url.origin()).then(|| candidate.to_string());
    }

    let url = Url::parse(candidate).ok()?;
    if url.origin() == base_url.origin() {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Picks the URL a flow returns the user to.
///
/// The referrer already stored on the session wins, then the `continue`
/// parameter, then the `Referer` header. Candidates that fail
/// [`validate_referrer`] are ignored. A missing referrer, or one pointing
/// back into the `/auth` routes, falls back to `default_redirect`.
pub fn resolve_referrer(
    current: Option<&str>,
    continue_url: Option<&str>,
    referer: Option<&str>,
    base_url: &Url,
    default_redirect: &str,
) -> String {
    let referrer = current
        .filter(|r| !r.trim().is_empty())
        .map(String::from)
        .or_else(|| continue_url.and_then(|c| validate_referrer(c, base_url)))
        .or_else(|| referer.and_then(|r| validate_referrer(r, base_url)));

    match referrer {
        Some(r) if !r.to_ascii_lowercase().contains("/auth") => r,
        _ => default_redirect.to_string(),
    }
}
