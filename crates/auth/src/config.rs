use std::time::Duration;

use url::Url;

use crate::error::AuthError;

const SECS_PER_DAY: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_TTL_DAYS: u64 = 14;
const MAX_SESSION_TTL_DAYS: u64 = 365;

/// Credentials and realm of the Auth0 tenant.
#[derive(Debug, Clone)]
pub struct Auth0Config {
    pub app_id: String,
    pub app_secret: String,
    /// Tenant base URL, e.g. `https://example.auth0.com`, without a trailing `/`.
    pub realm: String,
    /// Connection used when the login request does not name one.
    pub default_connection: Option<String>,
}

impl Auth0Config {
    /// Checks the required values are present.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` naming the first blank value.
    pub fn validate(&self) -> Result<(), AuthError> {
        for (key, value) in [
            ("AUTH0_APP_ID", &self.app_id),
            ("AUTH0_APP_SECRET", &self.app_secret),
            ("AUTH0_REALM", &self.realm),
        ] {
            if value.trim().is_empty() {
                return Err(AuthError::Config(format!("{key} is required")));
            }
        }
        Ok(())
    }
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub auth0: Auth0Config,
    pub base_url: Url,
    /// URL Auth0 sends the user back to with the authorization code.
    pub callback_url: Url,
    /// Where a flow ends when no usable referrer is known.
    pub redirect_url: String,
    pub session_ttl: Duration,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AUTH0_APP_ID`: Auth0 client ID (required)
    /// - `AUTH0_APP_SECRET`: Auth0 client secret (required)
    /// - `AUTH0_REALM`: Auth0 tenant URL (required)
    /// - `AUTH0_DEFAULT_CONNECTION`: Connection used when the request names none (optional)
    /// - `AUTH_BASE_URL`: Public URL of this app (default: `http://localhost:3000`)
    /// - `AUTH0_CALLBACK_URL`: Callback URL (default: `{AUTH_BASE_URL}/auth/auth0`)
    /// - `AUTH_REDIRECT_URL`: Fallback return URL (default: `AUTH_BASE_URL`)
    /// - `SESSION_TTL_DAYS`: Session TTL in days, 1 to 365 (default: 14)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies, `true`/`false`/`1`/`0`/`yes`/`no` (default: true)
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing or a URL is invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup using the same keys as [`AuthConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if a required value is missing, a URL is invalid, or
    /// `SESSION_TTL_DAYS`/`COOKIE_SECURE` cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} is required")))
        };

        let app_id = required("AUTH0_APP_ID")?;
        let app_secret = required("AUTH0_APP_SECRET")?;
        let realm = required("AUTH0_REALM")?.trim_end_matches('/').to_string();
        Url::parse(&realm)
            .map_err(|e| AuthError::Config(format!("AUTH0_REALM must be a valid URL: {e}")))?;

        let default_connection = lookup("AUTH0_DEFAULT_CONNECTION").filter(|v| !v.trim().is_empty());

        let base_url: Url = lookup("AUTH_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .parse()
            .map_err(|e| AuthError::Config(format!("AUTH_BASE_URL must be a valid URL: {e}")))?;

        let callback_url = match lookup("AUTH0_CALLBACK_URL") {
            Some(url) => url.parse().map_err(|e| {
                AuthError::Config(format!("AUTH0_CALLBACK_URL must be a valid URL: {e}"))
            })?,
            None => base_url
                .join("/auth/auth0")
                .map_err(|e| AuthError::Config(e.to_string()))?,
        };

        let redirect_url = lookup("AUTH_REDIRECT_URL").unwrap_or_else(|| base_url.to_string());

        let session_ttl = match lookup("SESSION_TTL_DAYS") {
            None => Duration::from_secs(DEFAULT_SESSION_TTL_DAYS * SECS_PER_DAY),
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(days @ 1..=MAX_SESSION_TTL_DAYS) => Duration::from_secs(days * SECS_PER_DAY),
                _ => {
                    return Err(AuthError::Config(format!(
                        "SESSION_TTL_DAYS must be a whole number of days between 1 and {MAX_SESSION_TTL_DAYS}, got {raw:?}"
                    )))
                }
            },
        };

        let cookie_secure = match lookup("COOKIE_SECURE") {
            None => true,
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AuthError::Config(format!("COOKIE_SECURE must be true or false, got {raw:?}"))
            })?,
        };

        Ok(Self {
            auth0: Auth0Config {
                app_id,
                app_secret,
                realm,
                default_connection,
            },
            base_url,
            callback_url,
            redirect_url,
            session_ttl,
            cookie_name: "ss-id".to_string(),
            cookie_secure,
        })
    }
}

/// Boolean env value: `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, any case.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
