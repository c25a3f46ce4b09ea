//! Session lifecycle decisions.
//!
//! Evaluation runs in four steps: prune stale sessions, decide whether the
//! heartbeat needs a fresh session, evaluate the limit, and commit the
//! renewed record. Nothing here performs I/O; store writes are returned
//! as [`PostAction`](heartgate_core::types::PostAction)s.

pub mod engine;
pub mod limit;
pub mod prune;
pub mod renewal;

pub use engine::{Decision, LifecycleEngine, Outcome};
pub use limit::LimitBreach;
pub use renewal::NewSessionTriggers;
