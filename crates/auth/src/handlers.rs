//! HTTP handlers for auth routes.

use axum::{
    extract::{Query, State},
    http::{header::REFERER, HeaderMap},
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use auth0_sample_core::auth::{
    generate_session_id, resolve_referrer, AuthResponse, AuthUserSession,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::AuthError;
use crate::extractors::{find_session, session_id_from_headers, CurrentSession};
use crate::flow::{authenticate, AuthRequest};
use crate::AuthState;

/// Query parameters of the provider endpoint.
///
/// The same endpoint starts the flow and receives Auth0's callback.
#[derive(Deserialize, Default)]
pub struct AuthenticateQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    /// Auth0 connection to log in with (e.g. `google-oauth2`).
    pub connection: Option<String>,
    /// URL to return to after the flow.
    #[serde(rename = "continue")]
    pub continue_url: Option<String>,
}

/// Query parameters for logout.
#[derive(Deserialize, Default)]
pub struct LogoutQuery {
    #[serde(rename = "continue")]
    pub continue_url: Option<String>,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /auth` - Current session summary (401 when not logged in)
/// - `GET /auth/auth0` - Start the Auth0 flow, or finish it when called back with `code`
/// - `GET /auth/logout` - End the current session
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth", get(auth_status))
        .route("/auth/auth0", get(auth0_login))
        .route("/auth/logout", get(logout))
}

async fn auth_status(CurrentSession(session): CurrentSession) -> Json<AuthResponse> {
    Json(AuthResponse::from(&session))
}

async fn auth0_login(
    State(state): State<AuthState>,
    Query(query): Query<AuthenticateQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    let mut session = find_session(&state, &headers)
        .await?
        .unwrap_or_else(|| AuthUserSession::new(generate_session_id(), Utc::now()));

    let request = AuthRequest {
        code: query.code,
        error: query.error,
        error_description: query.error_description,
        connection: query.connection,
        continue_url: query.continue_url,
        referer: referer(&headers),
    };

    let redirect_url = authenticate(&state, &mut session, &request).await?;

    let jar = jar.add(session_cookie(&state, &session));
    Ok((jar, Redirect::to(&redirect_url)))
}

async fn logout(
    State(state): State<AuthState>,
    Query(query): Query<LogoutQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AuthError> {
    if let Some(session_id) = session_id_from_headers(&headers, &state.config.cookie_name) {
        state.sessions.delete_session(&session_id).await?;
        tracing::info!(session_id = %session_id, "Session ended");
    }

    let redirect_url = resolve_referrer(
        None,
        query.continue_url.as_deref(),
        referer(&headers).as_deref(),
        &state.config.base_url,
        &state.config.redirect_url,
    );

    // Remove cookie
    let jar = jar.remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
    Ok((jar, Redirect::to(&redirect_url)))
}

fn referer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

fn session_cookie(state: &AuthState, session: &AuthUserSession) -> Cookie<'static> {
    Cookie::build((state.config.cookie_name.clone(), session.id.to_string()))
        .path("/")
        .http_only(true)
        .secure(state.config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(
            i64::try_from(state.config.session_ttl.as_secs()).unwrap_or(i64::MAX),
        ))
        .build()
}
