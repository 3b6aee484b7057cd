//! Mapping of an Auth0 user profile onto a session.

use serde_json::{Map, Value};

use super::{json_value_to_string, AuthUserSession};

/// Complex profile attributes that are never copied into `extra_data`.
pub const SKIPPED_PROFILE_KEYS: [&str; 2] = ["identities", "emails"];

/// Copy a user profile onto `session`.
///
/// Standard attributes overwrite the matching session fields (an absent
/// attribute clears the field). `groups`, when present, replaces the roles.
/// Every attribute except [`SKIPPED_PROFILE_KEYS`] lands in `extra_data`.
/// The identity fields are mirrored onto the `provider` token record.
pub fn apply_user_profile(session: &mut AuthUserSession, profile: &Map<String, Value>, provider: &str) {
    let get = |key: &str| profile.get(key).and_then(json_value_to_string);

    session.user_id = get("user_id");
    session.user_name = get("nickname");
    session.display_name = get("name");
    session.first_name = get("given_name");
    session.last_name = get("family_name");
    session.email = get("email");
    session.gender = get("gender");

    if let Some(groups) = profile.get("groups") {
        session.roles = match groups {
            Value::Array(items) => items.iter().filter_map(json_value_to_string).collect(),
            Value::String(group) => vec![group.clone()],
            _ => Vec::new(),
        };
    }

    for (key, value) in profile {
        if SKIPPED_PROFILE_KEYS.contains(&key.as_str()) {
            continue;
        }
        if let Some(value) = json_value_to_string(value) {
            session.extra_data.insert(key.clone(), value);
        }
    }

    let (user_id, user_name, display_name, first_name, last_name, email) = (
        session.user_id.clone(),
        session.user_name.clone(),
        session.display_name.clone(),
        session.first_name.clone(),
        session.last_name.clone(),
        session.email.clone(),
    );
    let tokens = session.tokens_mut(provider);
    tokens.user_id = user_id;
    tokens.user_name = user_name;
    tokens.display_name = display_name;
    tokens.first_name = first_name;
    tokens.last_name = last_name;
    tokens.email = email;
}
