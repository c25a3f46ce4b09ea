//! Request DTOs.

use serde::{Deserialize, Serialize};

use heartgate_service::HeartbeatRequest;

/// Heartbeat request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatBody {
    /// Encrypted heartbeat token.
    pub heartbeat_token: String,
    /// Optional playback progress, stored as-is.
    #[serde(default)]
    pub progress: Option<serde_json::Value>,
}

impl From<HeartbeatBody> for HeartbeatRequest {
    fn from(body: HeartbeatBody) -> Self {
        Self {
            heartbeat_token: body.heartbeat_token,
            progress: body.progress,
        }
    }
}
