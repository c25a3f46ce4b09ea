//! In-memory session store using dashmap.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use heartgate_core::result::AppResult;
use heartgate_core::traits::SessionStore;
use heartgate_core::types::{PostAction, UserSessionData, UserSessionMap};

/// In-memory session store.
///
/// Each user's session map lives in one dashmap entry. A batch is applied
/// while holding that entry, so concurrent heartbeats of the same user
/// see either none or all of it. Suitable for single-instance deployments.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    /// Session maps keyed by user id.
    sessions: Arc<DashMap<String, UserSessionMap>>,
    /// Progress values keyed by user id, then asset id.
    progress: Arc<DashMap<String, HashMap<String, serde_json::Value>>>,
    /// Total number of post actions applied since creation.
    applied: Arc<AtomicU64>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of post actions applied since the store was created.
    pub fn applied_actions(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }

    /// Apply one user's share of a batch under that user's entry lock.
    fn apply_for_user(&self, user_id: &str, actions: &[PostAction]) {
        {
            let mut sessions = self.sessions.entry(user_id.to_string()).or_default();
            for action in actions {
                match action {
                    PostAction::SetSession {
                        session_id, record, ..
                    } => {
                        sessions.insert(session_id.clone(), record.clone());
                    }
                    PostAction::DeleteSession { session_id, .. } => {
                        sessions.remove(session_id);
                    }
                    PostAction::UpdateProgress {
                        asset_id, progress, ..
                    } => {
                        self.progress
                            .entry(user_id.to_string())
                            .or_default()
                            .insert(asset_id.clone(), progress.clone());
                    }
                }
            }
        }

        self.sessions.remove_if(user_id, |_, sessions| sessions.is_empty());
        self.applied
            .fetch_add(actions.len() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn fetch_user_session_data(&self, user_id: &str) -> AppResult<UserSessionData> {
        let sessions = self
            .sessions
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        Ok(UserSessionData { sessions })
    }

    async fn execute_post_actions(&self, actions: Vec<PostAction>) -> AppResult<()> {
        if actions.is_empty() {
            return Ok(());
        }

        let mut by_user: Vec<(String, Vec<PostAction>)> = Vec::new();
        for action in actions {
            match by_user.iter_mut().find(|(user, _)| user == action.user_id()) {
                Some((_, batch)) => batch.push(action),
                None => by_user.push((action.user_id().to_string(), vec![action])),
            }
        }

        for (user_id, batch) in &by_user {
            debug!(user_id = %user_id, count = batch.len(), "Applying post actions in memory");
            self.apply_for_user(user_id, batch);
        }

        Ok(())
    }

    async fn fetch_progress(
        &self,
        user_id: &str,
        asset_id: &str,
    ) -> AppResult<Option<serde_json::Value>> {
        Ok(self
            .progress
            .get(user_id)
            .and_then(|assets| assets.get(asset_id).cloned()))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
