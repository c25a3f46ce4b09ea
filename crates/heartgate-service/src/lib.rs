//! # heartgate-service
//!
//! Business logic for Heartgate.
//!
//! - [`lifecycle`]: the pure decision engine. Given decoded claims, a
//!   snapshot of the user's sessions, and the current time, it decides
//!   which sessions are stale, whether the heartbeat starts a new session,
//!   and whether the session limit rejects it.
//! - [`heartbeat`]: the per-request orchestrator gluing the token codec,
//!   the session store, and the engine together.

pub mod heartbeat;
pub mod lifecycle;

pub use heartbeat::{HeartbeatReply, HeartbeatRequest, HeartbeatService};
pub use lifecycle::{Decision, LifecycleEngine};
