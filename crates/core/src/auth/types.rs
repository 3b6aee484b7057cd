use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cryptographically random session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tokens and identity a single OAuth provider handed to a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub provider: String,
    pub access_token: Option<String>,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Remaining scalar fields of the token response (`id_token`, `token_type`, ...).
    pub items: BTreeMap<String, String>,
}

impl OAuthTokens {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }
}

/// Session record the provider populates.
///
/// `id` is the session key carried by the cookie. The Auth0 `user_id` is kept
/// separately in `user_id` so a profile load never changes the session key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserSession {
    pub id: SessionId,
    /// Where the user goes back to once the flow finishes.
    pub referrer_url: Option<String>,
    pub is_authenticated: bool,
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub roles: Vec<String>,
    /// Every simple profile attribute, keyed by its Auth0 name.
    pub extra_data: BTreeMap<String, String>,
    pub provider_oauth_access: Vec<OAuthTokens>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthUserSession {
    /// Creates an empty, unauthenticated session.
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            referrer_url: None,
            is_authenticated: false,
            user_id: None,
            user_name: None,
            display_name: None,
            first_name: None,
            last_name: None,
            email: None,
            gender: None,
            roles: Vec::new(),
            extra_data: BTreeMap::new(),
            provider_oauth_access: Vec::new(),
            created_at: now,
            expires_at: now,
        }
    }

    /// Token record for `provider`, if the session has one.
    pub fn tokens(&self, provider: &str) -> Option<&OAuthTokens> {
        self.provider_oauth_access
            .iter()
            .find(|t| t.provider == provider)
    }

    /// Token record for `provider`, created on first use.
    pub fn tokens_mut(&mut self, provider: &str) -> &mut OAuthTokens {
        let index = match self
            .provider_oauth_access
            .iter()
            .position(|t| t.provider == provider)
        {
            Some(index) => index,
            None => {
                self.provider_oauth_access.push(OAuthTokens::new(provider));
                self.provider_oauth_access.len() - 1
            }
        };
        &mut self.provider_oauth_access[index]
    }
}

/// Body of `GET /auth` for an authenticated caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub session_id: String,
    pub user_name: Option<String>,
    pub display_name: Option<String>,
    pub referrer_url: Option<String>,
}

impl From<&AuthUserSession> for AuthResponse {
    fn from(session: &AuthUserSession) -> Self {
        Self {
            session_id: session.id.to_string(),
            user_name: session.user_name.clone(),
            display_name: session.display_name.clone(),
            referrer_url: session.referrer_url.clone(),
        }
    }
}

/// Successful answer of the token endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenGrant {
    pub access_token: Option<String>,
    /// Every other scalar field of the response, stringified.
    pub items: BTreeMap<String, String>,
}

/// Why a pre-auth or callback request ended in a failure redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The token endpoint answered 400.
    AccessTokenFailed,
    /// Any other outcome of the token exchange.
    Unknown,
}

impl AuthFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessTokenFailed => "AccessTokenFailed",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
