//! Session store trait for pluggable persistence backends.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{PostAction, UserSessionData};

/// Trait for session store backends (Redis or in-memory).
///
/// The store is read once per heartbeat and written once per heartbeat.
/// Implementations must apply a batch passed to
/// [`execute_post_actions`](SessionStore::execute_post_actions) as a unit:
/// concurrent heartbeats of one user may not observe half of a batch.
/// Read and write failures are reported as
/// [`ErrorKind::StoreUnavailable`](crate::error::ErrorKind::StoreUnavailable);
/// retrying is the backend's own business.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch the sessions currently stored for a user.
    ///
    /// An unknown user yields an empty session map, not an error.
    async fn fetch_user_session_data(&self, user_id: &str) -> AppResult<UserSessionData>;

    /// Apply a batch of queued mutations.
    async fn execute_post_actions(&self, actions: Vec<PostAction>) -> AppResult<()>;

    /// Read the last progress value recorded for a user and asset.
    async fn fetch_progress(
        &self,
        user_id: &str,
        asset_id: &str,
    ) -> AppResult<Option<serde_json::Value>>;

    /// Check that the store backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
