use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Auth errors for the auth0_sample_auth crate.
///
/// This wraps the core `AuthError` and adds crate-specific error variants
/// for I/O and configuration that can't be in the functional core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (code exchange, storage, etc.)
    #[error(transparent)]
    Core(#[from] auth0_sample_core::auth::AuthError),

    /// HTTP client error talking to Auth0
    #[error("HTTP error: {0}")]
    Http(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use auth0_sample_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::AccessTokenRejected => (StatusCode::BAD_REQUEST, self.to_string()),
                CoreError::SessionNotFound => (StatusCode::UNAUTHORIZED, self.to_string()),
                CoreError::CodeExchange(_)
                | CoreError::UserInfo(_)
                | CoreError::Storage(_)
                | CoreError::Provider(_) => {
                    tracing::error!("Auth error: {}", self);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Http(_) => {
                tracing::error!("HTTP error during auth: {}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "Authentication provider error".to_string(),
                )
            }
            AuthError::Config(_) => {
                tracing::error!("Config error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth0_sample_core::auth::AuthError as CoreError;

    #[test]
    fn storage_errors_hide_details() {
        let response = AuthError::from(CoreError::Storage("disk on fire".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_session_is_unauthorized() {
        let response = AuthError::from(CoreError::SessionNotFound).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn http_errors_are_bad_gateway() {
        let response = AuthError::Http("connection reset".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
