use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde_json::Value;

use super::{AuthUserSession, SessionId};

/// Generate a cryptographically random session ID.
pub fn generate_session_id() -> SessionId {
    let id: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    SessionId::new(id)
}

/// Check if a session has expired.
pub fn is_session_expired(session: &AuthUserSession, now: DateTime<Utc>) -> bool {
    session.expires_at <= now
}

/// Calculate session expiry from a save time and TTL.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn calculate_expiry(saved_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    saved_at
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether `session` holds a usable login for `provider`.
pub fn is_authorized(session: &AuthUserSession, provider: &str) -> bool {
    session.is_authenticated
        && session
            .tokens(provider)
            .and_then(|t| t.access_token.as_deref())
            .is_some_and(|token| !token.is_empty())
}

/// Append `key=value` to the fragment of `url`.
///
/// The first parameter opens the fragment with `#`, later ones are joined
/// with `/`. The value is percent-encoded; `None` yields an empty value.
pub fn add_hash_param(url: &str, key: &str, value: Option<&str>) -> String {
    let separator = if url.contains('#') { '/' } else { '#' };
    let value = value.map(urlencoding::encode).unwrap_or_default();
    format!("{url}{separator}{key}={value}")
}

/// String form of a profile value: strings verbatim, everything else as
/// JSON text. `null` has no string form.
pub fn json_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
