//! Session storage implementations.
//!
//! Provides the in-memory `SessionRepository`. Durable storage belongs to the
//! host application, which can hand its own repository to `AuthState`.

mod inmemory;

pub use inmemory::SessionStore;
