//! Response DTOs.

use serde::{Deserialize, Serialize};

use heartgate_service::HeartbeatReply;

/// Successful heartbeat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatTokenResponse {
    /// Token for the next heartbeat.
    pub heartbeat_token: String,
}

impl From<HeartbeatReply> for HeartbeatTokenResponse {
    fn from(reply: HeartbeatReply) -> Self {
        Self {
            heartbeat_token: reply.heartbeat_token,
        }
    }
}
