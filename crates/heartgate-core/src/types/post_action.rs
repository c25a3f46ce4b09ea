//! Deferred store mutations.
//!
//! The lifecycle engine never writes to the store. It describes what should
//! change as an ordered list of [`PostAction`]s, and the store applies that
//! list as one batch once the response is known.

use serde::{Deserialize, Serialize};

use super::session::SessionRecord;

/// One queued mutation against the session store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostAction {
    /// Create or overwrite a session record.
    SetSession {
        /// Owner of the session.
        user_id: String,
        /// Session to write.
        session_id: String,
        /// New record.
        record: SessionRecord,
    },
    /// Remove a session record.
    DeleteSession {
        /// Owner of the session.
        user_id: String,
        /// Session to remove.
        session_id: String,
    },
    /// Remember how far the user got in an asset.
    UpdateProgress {
        /// Owner of the progress value.
        user_id: String,
        /// Asset the progress refers to.
        asset_id: String,
        /// Opaque progress value supplied by the client.
        progress: serde_json::Value,
    },
}

impl PostAction {
    /// User whose data the action touches.
    pub fn user_id(&self) -> &str {
        match self {
            Self::SetSession { user_id, .. }
            | Self::DeleteSession { user_id, .. }
            | Self::UpdateProgress { user_id, .. } => user_id,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetSession { .. } => "set_session",
            Self::DeleteSession { .. } => "delete_session",
            Self::UpdateProgress { .. } => "update_progress",
        }
    }
}
