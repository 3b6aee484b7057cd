//! Mock Auth0 tenant for development.
//!
//! Serves the authorize, token and userinfo endpoints so the login flow can
//! run end to end without a real Auth0 account.

mod server;
mod templates;

pub use server::{mock_idp_router, MockIdpServer};
