//! Redis key builders for all Heartgate entries.
//!
//! Keys are relative; the Redis client adds the configured prefix.

/// Hash of `session_id -> SessionRecord` JSON for a user.
pub fn user_sessions(user_id: &str) -> String {
    format!("sessions:{user_id}")
}

/// Hash of `asset_id -> progress` JSON for a user.
pub fn user_progress(user_id: &str) -> String {
    format!("progress:{user_id}")
}
