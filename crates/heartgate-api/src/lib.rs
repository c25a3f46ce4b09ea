//! # heartgate-api
//!
//! HTTP API layer for Heartgate built on Axum.
//!
//! Exposes `POST /heartbeat` and `GET /healthcheck`, the request logging
//! middleware, DTOs, and [`ApiError`](error::ApiError), which maps
//! [`AppError`](heartgate_core::AppError) to HTTP responses.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
