//! Shared application state.

use auth0_sample_auth::AuthState;
use axum::extract::FromRef;

/// Shared application state.
///
/// Cloned for each request handler. Auth handlers and extractors pull the
/// `AuthState` out of it.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
}

impl AppState {
    pub fn new(auth: AuthState) -> Self {
        Self { auth }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
