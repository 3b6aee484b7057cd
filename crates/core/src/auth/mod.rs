mod error;
mod functions;
mod profile;
mod traits;
mod types;
mod validation;

pub use error::AuthError;
pub use functions::{
    add_hash_param, calculate_expiry, generate_session_id, is_authorized, is_session_expired,
    json_value_to_string,
};
pub use profile::{apply_user_profile, SKIPPED_PROFILE_KEYS};
pub use traits::{OAuthProviderClient, Result, SessionRepository};
pub use types::{
    AuthFailure, AuthResponse, AuthUserSession, OAuthTokens, SessionId, TokenGrant,
};
pub use validation::{resolve_referrer, validate_referrer};
