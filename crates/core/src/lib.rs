//! Framework-free core of the Auth0 provider: session types, profile
//! mapping, redirect helpers and the traits the auth crate plugs into.

pub mod auth;
