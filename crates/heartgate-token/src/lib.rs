//! # heartgate-token
//!
//! Heartbeat tokens are the only state a client carries between
//! heartbeats. This crate turns [`HeartbeatClaims`] into an opaque,
//! tamper-evident string and back.
//!
//! [`HeartbeatClaims`]: heartgate_core::types::HeartbeatClaims

pub mod codec;
pub mod error;

pub use codec::TokenCodec;
pub use error::TokenError;
