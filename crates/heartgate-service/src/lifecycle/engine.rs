//! The session lifecycle engine.

use chrono::{DateTime, Utc};
use tracing::debug;

use heartgate_core::types::{HeartbeatClaims, PostAction, SessionRecord, UserSessionMap};

use super::limit::LimitBreach;
use super::prune::prune_sessions;
use super::renewal::NewSessionTriggers;

/// Whether the heartbeat was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The session was renewed or created.
    Accepted {
        /// Record written for the session.
        record: SessionRecord,
        /// Claims to seal into the response token.
        claims: HeartbeatClaims,
    },
    /// The limit check failed.
    Rejected(LimitBreach),
}

/// Everything the engine decided for one heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Session the heartbeat now belongs to. On rejection this is the claimed
    /// id, which is `None` for backend-originated tokens.
    pub session_id: Option<String>,
    /// Why a new session is (or would have been) required.
    pub triggers: NewSessionTriggers,
    /// Sessions that survived pruning.
    pub active_sessions: UserSessionMap,
    /// Ids removed by pruning.
    pub pruned: Vec<String>,
    /// Limit check result, kept on both paths for logging.
    pub limit: LimitBreach,
    /// Accept or reject.
    pub outcome: Outcome,
    /// Store mutations to apply once the response is known.
    pub post_actions: Vec<PostAction>,
}

impl Decision {
    /// Whether the heartbeat was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted { .. })
    }

    /// Whether a fresh session id was issued.
    pub fn is_new_session(&self) -> bool {
        self.is_accepted() && self.triggers.any()
    }
}

/// Pure decision function over a session snapshot.
///
/// The only configurable part is the id generator.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleEngine {
    mint: fn() -> String,
}

impl Default for LifecycleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleEngine {
    /// Engine issuing random UUID v4 session ids.
    pub fn new() -> Self {
        Self {
            mint: || uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Engine issuing ids from `mint`.
    pub fn with_id_source(mint: fn() -> String) -> Self {
        Self { mint }
    }

    /// Decide the fate of one heartbeat.
    ///
    /// `progress` is queued as an `UpdateProgress` action on acceptance,
    /// provided the claims name an asset.
    pub fn evaluate(
        &self,
        claims: &HeartbeatClaims,
        sessions: &UserSessionMap,
        now: DateTime<Utc>,
        progress: Option<&serde_json::Value>,
    ) -> Decision {
        let pruned = prune_sessions(claims, sessions, now);
        let mut post_actions: Vec<PostAction> = pruned
            .expired
            .iter()
            .map(|session_id| PostAction::DeleteSession {
                user_id: claims.user_id.clone(),
                session_id: session_id.clone(),
            })
            .collect();

        if !pruned.expired.is_empty() {
            debug!(expired = ?pruned.expired, "Pruned silent sessions");
        }

        let triggers = NewSessionTriggers::evaluate(claims, &pruned.active, now);
        if triggers.any() {
            debug!(?triggers, "Heartbeat needs a new session");
        }

        let limit = LimitBreach::evaluate(claims, &pruned.active, claims.session_id.as_deref());
        if limit.is_exceeded() {
            debug!(
                sessions_edge_exceeded = limit.sessions_edge_exceeded,
                session_over_limit = limit.session_over_limit,
                position = ?limit.position,
                "Session limit exceeded"
            );

            return Decision {
                session_id: claims.session_id.clone(),
                triggers,
                active_sessions: pruned.active,
                pruned: pruned.expired,
                limit: limit.clone(),
                outcome: Outcome::Rejected(limit),
                post_actions,
            };
        }

        let (session_id, record) = match claims.session_id.as_ref() {
            Some(session_id) if !triggers.any() => {
                let record = pruned
                    .active
                    .get(session_id)
                    .map(|previous| previous.renewed(now))
                    .unwrap_or_else(|| SessionRecord::started(now));
                (session_id.clone(), record)
            }
            _ => {
                let session_id = (self.mint)();
                debug!(session_id = %session_id, "Creating new session");
                (session_id, SessionRecord::started(now))
            }
        };

        post_actions.push(PostAction::SetSession {
            user_id: claims.user_id.clone(),
            session_id: session_id.clone(),
            record: record.clone(),
        });

        if let (Some(progress), Some(asset_id)) = (progress, claims.asset_id.as_ref()) {
            post_actions.push(PostAction::UpdateProgress {
                user_id: claims.user_id.clone(),
                asset_id: asset_id.clone(),
                progress: progress.clone(),
            });
        }

        let mut renewed = claims.clone();
        renewed.session_id = Some(session_id.clone());
        renewed.started_at = Some(record.started_at);
        renewed.timestamp = Some(now);

        Decision {
            session_id: Some(session_id),
            triggers,
            active_sessions: pruned.active,
            pruned: pruned.expired,
            limit,
            outcome: Outcome::Accepted {
                record,
                claims: renewed,
            },
            post_actions,
        }
    }
}
