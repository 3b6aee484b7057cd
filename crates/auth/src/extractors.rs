//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use axum_extra::extract::CookieJar;
use auth0_sample_core::auth::{is_authorized, AuthUserSession, SessionId};

use crate::error::AuthError;
use crate::AuthState;

/// Extractor for a session logged in through the provider. Returns 401 otherwise.
pub struct CurrentSession(pub AuthUserSession);

impl<S> FromRequestParts<S> for CurrentSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let session = find_session(&auth_state, &parts.headers)
            .await
            .map_err(|_| (StatusCode::INTERNAL_SERVER_ERROR, "Session lookup failed"))?
            .ok_or((StatusCode::UNAUTHORIZED, "Session not found"))?;

        if !is_authorized(&session, auth_state.provider.provider()) {
            return Err((StatusCode::UNAUTHORIZED, "Not authenticated"));
        }

        Ok(CurrentSession(session))
    }
}

/// Extractor for the caller's session, authenticated or not. `None` if there is none.
pub struct OptionalSession(pub Option<AuthUserSession>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        match find_session(&auth_state, &parts.headers).await {
            Ok(session) => Ok(OptionalSession(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                Ok(OptionalSession(None))
            }
        }
    }
}

/// Session ID from the `Authorization: Bearer` header, falling back to the cookie.
pub(crate) fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<SessionId> {
    // Try Authorization header first (for API clients)
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(|token| SessionId::new(token.to_string()));

    // Fall back to cookie (for web clients)
    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(cookie_name)
            .map(|cookie| SessionId::new(cookie.value().to_string()))
    })
}

/// Look up the live session the request points at.
pub(crate) async fn find_session(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<Option<AuthUserSession>, AuthError> {
    let Some(id) = session_id_from_headers(headers, &state.config.cookie_name) else {
        return Ok(None);
    };
    Ok(state.sessions.get_session(&id).await?)
}
