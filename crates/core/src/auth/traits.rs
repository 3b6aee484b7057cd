use async_trait::async_trait;
use serde_json::{Map, Value};
use url::Url;

use super::{AuthError, AuthUserSession, SessionId, TokenGrant};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// The three calls an OAuth2 authorization-code provider has to answer.
#[async_trait]
pub trait OAuthProviderClient: Send + Sync {
    /// Provider name the session's token record is filed under.
    fn provider(&self) -> &str;

    /// Authorization URL the user is redirected to, for the given connection.
    fn authorization_url(&self, connection: &str) -> Result<Url>;

    /// Exchange an authorization code for an access token.
    ///
    /// A `400` from the token endpoint must surface as
    /// [`AuthError::AccessTokenRejected`].
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Fetch the user profile for an access token.
    async fn user_info(&self, access_token: &str) -> Result<Map<String, Value>>;
}

/// Session storage abstraction.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Retrieve a live session by ID.
    async fn get_session(&self, id: &SessionId) -> Result<Option<AuthUserSession>>;

    /// Insert or replace a session.
    async fn save_session(&self, session: &AuthUserSession) -> Result<()>;

    /// Delete a specific session.
    async fn delete_session(&self, id: &SessionId) -> Result<()>;
}
