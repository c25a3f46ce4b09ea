//! # heartgate-core
//!
//! Core crate for Heartgate. Contains the heartbeat claim and session
//! record types, configuration schemas, the session store trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Heartgate crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
