//! Per-request heartbeat orchestration.

mod service;

pub use service::{HeartbeatReply, HeartbeatRequest, HeartbeatService};
