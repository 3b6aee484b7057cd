//! Application state for auth.

use std::sync::Arc;

use auth0_sample_core::auth::{OAuthProviderClient, SessionRepository};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::providers::Auth0Provider;

/// Shared state for auth handlers.
#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionRepository>,
    pub provider: Arc<dyn OAuthProviderClient>,
    pub config: AuthConfig,
}

impl AuthState {
    /// Creates a new AuthState backed by the Auth0 provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the Auth0 configuration is incomplete.
    pub fn new(sessions: Arc<dyn SessionRepository>, config: AuthConfig) -> Result<Self, AuthError> {
        let provider = Auth0Provider::new(&config.auth0, &config.callback_url)?;
        Ok(Self::with_provider(sessions, Arc::new(provider), config))
    }

    /// Creates an AuthState around an already built provider client.
    pub fn with_provider(
        sessions: Arc<dyn SessionRepository>,
        provider: Arc<dyn OAuthProviderClient>,
        config: AuthConfig,
    ) -> Self {
        Self {
            sessions,
            provider,
            config,
        }
    }

    /// Session TTL as a chrono duration.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.session_ttl).unwrap_or(chrono::Duration::MAX)
    }
}
