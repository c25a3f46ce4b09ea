//! Detection of heartbeats that must start a fresh session.

use chrono::{DateTime, Utc};
use serde::Serialize;

use heartgate_core::types::{HeartbeatClaims, UserSessionMap};

/// Independent reasons for discarding the claimed session id.
///
/// Any single flag forces a new session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NewSessionTriggers {
    /// The token carries no session id; the backend issued it.
    pub backend_originated: bool,
    /// The claimed session is not in the active set.
    pub session_missing: bool,
    /// The stored last-seen time differs from the token's timestamp, so the
    /// token is a replay or was superseded by a later one.
    pub heartbeat_not_expected: bool,
    /// The heartbeat arrived sooner than `heartbeat_cycle - cycle_lower_tolerance`
    /// after the previous one.
    pub received_too_early: bool,
}

impl NewSessionTriggers {
    /// Evaluate every trigger against the active (already pruned) sessions.
    pub fn evaluate(
        claims: &HeartbeatClaims,
        active: &UserSessionMap,
        now: DateTime<Utc>,
    ) -> Self {
        let record = claims
            .session_id
            .as_ref()
            .and_then(|session_id| active.get(session_id));

        Self {
            backend_originated: claims.is_backend_originated(),
            session_missing: record.is_none(),
            heartbeat_not_expected: record
                .is_some_and(|record| claims.timestamp != Some(record.timestamp)),
            received_too_early: record.is_some_and(|record| {
                claims
                    .minimum_interval()
                    .is_some_and(|interval| now - record.timestamp < interval)
            }),
        }
    }

    /// Whether a new session has to be created.
    pub fn any(&self) -> bool {
        self.backend_originated
            || self.session_missing
            || self.heartbeat_not_expected
            || self.received_too_early
    }
}
