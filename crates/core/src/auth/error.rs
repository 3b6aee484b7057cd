use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token endpoint rejected the authorization code")]
    AccessTokenRejected,

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("failed to load user info: {0}")]
    UserInfo(String),

    #[error("session not found")]
    SessionNotFound,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}
