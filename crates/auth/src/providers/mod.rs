//! OAuth provider implementations.

mod auth0;

pub use auth0::{Auth0Provider, PROVIDER_NAME};
