//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use heartgate_core::config::AppConfig;
use heartgate_service::HeartbeatService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Heartbeat orchestrator, owning the session store
    pub heartbeat_service: Arc<HeartbeatService>,
}

impl AppState {
    /// Creates the state from its parts.
    pub fn new(config: Arc<AppConfig>, heartbeat_service: Arc<HeartbeatService>) -> Self {
        Self {
            config,
            heartbeat_service,
        }
    }
}
