//! Heartbeat service: decode, evaluate, seal, flush.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::{Span, debug};

use heartgate_core::error::AppError;
use heartgate_core::traits::SessionStore;
use heartgate_token::TokenCodec;

use crate::lifecycle::{Decision, LifecycleEngine, Outcome};

/// Input of one heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    /// Token from the backend or from the previous heartbeat reply.
    pub heartbeat_token: String,
    /// Opaque playback progress reported by the client.
    #[serde(default)]
    pub progress: Option<serde_json::Value>,
}

impl HeartbeatRequest {
    /// Request without progress.
    pub fn new(heartbeat_token: impl Into<String>) -> Self {
        Self {
            heartbeat_token: heartbeat_token.into(),
            progress: None,
        }
    }

    /// Progress value if it counts as supplied.
    ///
    /// `null`, `false`, `0`, and `""` are treated as absent.
    pub fn supplied_progress(&self) -> Option<&serde_json::Value> {
        self.progress.as_ref().filter(|value| is_truthy(value))
    }
}

/// Result of an accepted heartbeat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartbeatReply {
    /// Token the client must send with its next heartbeat.
    pub heartbeat_token: String,
    /// Session the heartbeat was counted against.
    pub session_id: String,
    /// Whether that session was created by this heartbeat.
    pub new_session: bool,
}

/// Processes heartbeats against the session store.
#[derive(Debug, Clone)]
pub struct HeartbeatService {
    /// Token codec.
    codec: Arc<TokenCodec>,
    /// Session store.
    store: Arc<dyn SessionStore>,
    /// Decision engine.
    engine: LifecycleEngine,
}

impl HeartbeatService {
    /// Creates a new heartbeat service.
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            codec,
            store,
            engine: LifecycleEngine::new(),
        }
    }

    /// Replaces the lifecycle engine.
    pub fn with_engine(mut self, engine: LifecycleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Processes a heartbeat at the current wall-clock time.
    pub async fn process(&self, request: &HeartbeatRequest) -> Result<HeartbeatReply, AppError> {
        self.process_at(request, Utc::now().trunc_subsecs(3)).await
    }

    /// Processes a heartbeat at `now`.
    ///
    /// Store mutations are flushed exactly once after the outcome is known,
    /// including on limit rejection. A token that cannot be decoded touches
    /// nothing.
    #[tracing::instrument(name = "heartbeat", skip_all, fields(user_id = tracing::field::Empty))]
    pub async fn process_at(
        &self,
        request: &HeartbeatRequest,
        now: DateTime<Utc>,
    ) -> Result<HeartbeatReply, AppError> {
        let claims = self.codec.decode(&request.heartbeat_token).map_err(|e| {
            debug!(error = %e, "Rejecting undecodable heartbeat token");
            AppError::from(e)
        })?;
        Span::current().record("user_id", claims.user_id.as_str());
        debug!(session_id = ?claims.session_id, "Token decoded");

        let snapshot = self.store.fetch_user_session_data(&claims.user_id).await?;
        debug!(sessions = snapshot.sessions.len(), "Session snapshot fetched");

        let decision =
            self.engine
                .evaluate(&claims, &snapshot.sessions, now, request.supplied_progress());
        debug!(
            accepted = decision.is_accepted(),
            new_session = decision.is_new_session(),
            actions = decision.post_actions.len(),
            "Heartbeat evaluated"
        );

        let reply = self.seal(&decision)?;

        self.store.execute_post_actions(decision.post_actions).await?;
        debug!("Post actions flushed");

        reply.ok_or_else(AppError::limit_exceeded)
    }

    /// Seals the reply token of an accepted decision.
    fn seal(&self, decision: &Decision) -> Result<Option<HeartbeatReply>, AppError> {
        let Outcome::Accepted { claims, .. } = &decision.outcome else {
            return Ok(None);
        };
        let session_id = decision
            .session_id
            .clone()
            .ok_or_else(|| AppError::internal("Accepted heartbeat has no session id"))?;

        Ok(Some(HeartbeatReply {
            heartbeat_token: self.codec.encode(claims)?,
            session_id,
            new_session: decision.is_new_session(),
        }))
    }
}

/// Loose truthiness of a JSON value.
fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
