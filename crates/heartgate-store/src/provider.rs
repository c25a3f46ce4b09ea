//! Store manager that dispatches to the configured backend.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use heartgate_core::config::StoreConfig;
use heartgate_core::error::AppError;
use heartgate_core::result::AppResult;
use heartgate_core::traits::SessionStore;
use heartgate_core::types::{PostAction, UserSessionData};

/// Store manager that wraps the configured session store backend.
///
/// The backend is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store backend.
    inner: Arc<dyn SessionStore>,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        let inner: Arc<dyn SessionStore> = match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis session store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Arc::new(crate::redis::RedisSessionStore::new(client, &config.redis))
            }
            #[cfg(feature = "memory")]
            "memory" => {
                warn!(
                    "Using the in-memory session store; sessions are lost on restart and \
                     not shared between instances"
                );
                Arc::new(crate::memory::MemorySessionStore::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown store provider: '{other}'. Supported: memory, redis"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a store manager from an existing backend (for testing).
    pub fn from_store(store: Arc<dyn SessionStore>) -> Self {
        Self { inner: store }
    }
}

#[async_trait]
impl SessionStore for StoreManager {
    async fn fetch_user_session_data(&self, user_id: &str) -> AppResult<UserSessionData> {
        self.inner.fetch_user_session_data(user_id).await
    }

    async fn execute_post_actions(&self, actions: Vec<PostAction>) -> AppResult<()> {
        self.inner.execute_post_actions(actions).await
    }

    async fn fetch_progress(
        &self,
        user_id: &str,
        asset_id: &str,
    ) -> AppResult<Option<serde_json::Value>> {
        self.inner.fetch_progress(user_id, asset_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
