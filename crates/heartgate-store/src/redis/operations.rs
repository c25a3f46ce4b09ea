//! Redis session store implementation.
//!
//! Each user owns two hashes: `sessions:{user}` (session id to record JSON)
//! and `progress:{user}` (asset id to progress JSON). A batch of post
//! actions is sent as a single `MULTI`/`EXEC` pipeline.

use std::collections::HashMap;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

use heartgate_core::config::RedisStoreConfig;
use heartgate_core::error::{AppError, ErrorKind};
use heartgate_core::result::AppResult;
use heartgate_core::traits::SessionStore;
use heartgate_core::types::{PostAction, SessionRecord, UserSessionData, UserSessionMap};

use super::client::RedisClient;
use crate::keys;

/// Redis-backed session store shared by every Heartgate instance.
#[derive(Debug, Clone)]
pub struct RedisSessionStore {
    /// Redis client.
    client: RedisClient,
    /// Expiry refreshed on every write to a user's hashes.
    ttl_seconds: i64,
}

impl RedisSessionStore {
    /// Create a new Redis session store.
    pub fn new(client: RedisClient, config: &RedisStoreConfig) -> Self {
        Self {
            client,
            ttl_seconds: i64::try_from(config.session_ttl_seconds).unwrap_or(i64::MAX),
        }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::StoreUnavailable, format!("Redis error: {e}"), e)
    }

    /// Build the transaction applying a batch.
    fn build_pipeline(&self, actions: &[PostAction]) -> AppResult<redis::Pipeline> {
        let mut pipe = redis::pipe();
        pipe.atomic();

        for action in actions {
            match action {
                PostAction::SetSession {
                    user_id,
                    session_id,
                    record,
                } => {
                    let key = self.client.prefixed_key(&keys::user_sessions(user_id));
                    let value = serde_json::to_string(record)?;
                    pipe.hset(&key, session_id, value).ignore();
                    pipe.expire(&key, self.ttl_seconds).ignore();
                }
                PostAction::DeleteSession {
                    user_id,
                    session_id,
                } => {
                    let key = self.client.prefixed_key(&keys::user_sessions(user_id));
                    pipe.hdel(&key, session_id).ignore();
                }
                PostAction::UpdateProgress {
                    user_id,
                    asset_id,
                    progress,
                } => {
                    let key = self.client.prefixed_key(&keys::user_progress(user_id));
                    let value = serde_json::to_string(progress)?;
                    pipe.hset(&key, asset_id, value).ignore();
                    pipe.expire(&key, self.ttl_seconds).ignore();
                }
            }
        }

        Ok(pipe)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn fetch_user_session_data(&self, user_id: &str) -> AppResult<UserSessionData> {
        let key = self.client.prefixed_key(&keys::user_sessions(user_id));
        let mut conn = self.client.conn_mut();
        let raw: HashMap<String, String> = conn.hgetall(&key).await.map_err(Self::map_err)?;

        let mut sessions = UserSessionMap::new();
        for (session_id, json) in raw {
            match serde_json::from_str::<SessionRecord>(&json) {
                Ok(record) => {
                    sessions.insert(session_id, record);
                }
                Err(e) => {
                    warn!(
                        user_id = %user_id,
                        session_id = %session_id,
                        error = %e,
                        "Skipping unreadable session record"
                    );
                }
            }
        }

        Ok(UserSessionData { sessions })
    }

    async fn execute_post_actions(&self, actions: Vec<PostAction>) -> AppResult<()> {
        if actions.is_empty() {
            return Ok(());
        }

        let pipe = self.build_pipeline(&actions)?;
        let mut conn = self.client.conn_mut();
        let _: () = pipe.query_async(&mut conn).await.map_err(Self::map_err)?;

        debug!(count = actions.len(), "Applied post actions in Redis");
        Ok(())
    }

    async fn fetch_progress(
        &self,
        user_id: &str,
        asset_id: &str,
    ) -> AppResult<Option<serde_json::Value>> {
        let key = self.client.prefixed_key(&keys::user_progress(user_id));
        let mut conn = self.client.conn_mut();
        let raw: Option<String> = conn.hget(&key, asset_id).await.map_err(Self::map_err)?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
