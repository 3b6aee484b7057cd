//! Auth0 authentication for axum applications.
//!
//! This crate provides:
//! - The Auth0 provider (authorize redirect, code exchange, user info)
//! - The `/auth` routes that drive the two-step login flow
//! - An in-memory session store
//! - Axum extractors for the current session

mod config;
mod error;
mod extractors;
mod flow;
mod handlers;
mod providers;
mod sessions;
mod state;

pub use config::{Auth0Config, AuthConfig};
pub use error::AuthError;
pub use extractors::{CurrentSession, OptionalSession};
pub use flow::{authenticate, AuthRequest};
pub use handlers::auth_routes;
pub use providers::{Auth0Provider, PROVIDER_NAME};
pub use sessions::SessionStore;
pub use state::AuthState;

#[cfg(feature = "mock")]
pub mod mock_idp;
