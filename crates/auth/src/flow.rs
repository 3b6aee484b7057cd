//! The two-step Auth0 login flow.
//!
//! A request without an authorization code is sent to the provider's
//! authorize endpoint. A request carrying a code is exchanged for an access
//! token, the user profile is loaded onto the session and the caller is sent
//! back to the referrer with a `#s=1` or `#f=...` marker.

use chrono::Utc;

use auth0_sample_core::auth::{
    add_hash_param, apply_user_profile, calculate_expiry, resolve_referrer, AuthError as CoreError,
    AuthFailure, AuthUserSession, OAuthProviderClient,
};

use crate::error::AuthError;
use crate::AuthState;

/// What the login endpoint was called with.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub connection: Option<String>,
    /// `continue` query parameter.
    pub continue_url: Option<String>,
    /// `Referer` request header.
    pub referer: Option<String>,
}

/// Run one step of the login flow for `session` and return the redirect target.
///
/// # Errors
///
/// Only session storage and authorize-URL failures are errors. Token and
/// profile failures end in a redirect carrying the failure marker.
pub async fn authenticate(
    state: &AuthState,
    session: &mut AuthUserSession,
    request: &AuthRequest,
) -> Result<String, AuthError> {
    let provider = state.provider.as_ref();
    init_session(state, session, request);
    let referrer = session
        .referrer_url
        .clone()
        .unwrap_or_else(|| state.config.redirect_url.clone());

    if let Some(error) = non_blank(request.error.as_deref()) {
        tracing::warn!(
            error,
            error_description = ?request.error_description,
            "Auth0 returned an error"
        );
        let url = add_hash_param(&referrer, "error", Some(error));
        save_session(state, session).await?;
        return Ok(add_hash_param(
            &url,
            "error_description",
            request.error_description.as_deref(),
        ));
    }

    let Some(code) = non_blank(request.code.as_deref()) else {
        let connection = non_blank(request.connection.as_deref())
            .or(state.config.auth0.default_connection.as_deref())
            .unwrap_or_default();
        let pre_auth_url = provider.authorization_url(connection)?;
        save_session(state, session).await?;

        tracing::debug!(session_id = %session.id, connection, "Redirecting to Auth0");
        return Ok(pre_auth_url.to_string());
    };

    let grant = match provider.exchange_code(code).await {
        Ok(grant) => grant,
        Err(CoreError::AccessTokenRejected) => {
            tracing::warn!(session_id = %session.id, "Auth0 rejected the authorization code");
            return fail(state, session, &referrer, AuthFailure::AccessTokenFailed).await;
        }
        Err(e) => {
            tracing::error!(session_id = %session.id, error = %e, "Access token exchange failed");
            return fail(state, session, &referrer, AuthFailure::Unknown).await;
        }
    };

    let Some(access_token) = grant.access_token.filter(|t| !t.is_empty()) else {
        tracing::error!(session_id = %session.id, "Token response carried no access_token");
        return fail(state, session, &referrer, AuthFailure::Unknown).await;
    };

    let tokens = session.tokens_mut(provider.provider());
    tokens.access_token = Some(access_token);
    tokens.items.extend(grant.items);
    session.is_authenticated = true;

    load_user_auth_info(provider, session).await;
    save_session(state, session).await?;

    tracing::info!(
        session_id = %session.id,
        user_id = ?session.user_id,
        "Auth0 login succeeded"
    );
    Ok(add_hash_param(&referrer, "s", Some("1")))
}

/// Fetch the profile for the session's access token and map it onto the session.
///
/// Failures are logged and otherwise ignored; the session keeps whatever it
/// already had.
pub async fn load_user_auth_info(provider: &dyn OAuthProviderClient, session: &mut AuthUserSession) {
    let Some(tokens) = session.tokens(provider.provider()) else {
        return;
    };
    let display_name = tokens.display_name.clone().unwrap_or_default();
    let Some(access_token) = tokens.access_token.clone() else {
        return;
    };

    match provider.user_info(&access_token).await {
        Ok(profile) => apply_user_profile(session, &profile, provider.provider()),
        Err(e) => tracing::error!(
            error = %e,
            "Could not retrieve auth0 user info for '{}'",
            display_name
        ),
    }
}

/// Persist `session` with a fresh expiry.
pub async fn save_session(state: &AuthState, session: &mut AuthUserSession) -> Result<(), AuthError> {
    session.expires_at = calculate_expiry(Utc::now(), state.session_ttl());
    state.sessions.save_session(session).await?;
    Ok(())
}

/// Fill in the referrer and make sure the provider has a token record.
fn init_session(state: &AuthState, session: &mut AuthUserSession, request: &AuthRequest) {
    session.referrer_url = Some(resolve_referrer(
        session.referrer_url.as_deref(),
        request.continue_url.as_deref(),
        request.referer.as_deref(),
        &state.config.base_url,
        &state.config.redirect_url,
    ));
    session.tokens_mut(state.provider.provider());
}

/// Save the unauthenticated session and redirect with `#f=<failure>`.
async fn fail(
    state: &AuthState,
    session: &mut AuthUserSession,
    referrer: &str,
    failure: AuthFailure,
) -> Result<String, AuthError> {
    save_session(state, session).await?;
    Ok(add_hash_param(referrer, "f", Some(failure.as_str())))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
