//! Removal of sessions that stopped sending heartbeats.

use chrono::{DateTime, Utc};

use heartgate_core::types::{HeartbeatClaims, UserSessionMap};

/// Result of pruning a user's session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pruned {
    /// Sessions still inside the silence window.
    pub active: UserSessionMap,
    /// Ids of sessions that fell outside it.
    pub expired: Vec<String>,
}

/// Split a snapshot into active and expired sessions.
///
/// A session expires when `timestamp + heartbeat_cycle + cycle_upper_tolerance`
/// lies strictly before `now`. Without a silence window nothing expires.
pub fn prune_sessions(
    claims: &HeartbeatClaims,
    sessions: &UserSessionMap,
    now: DateTime<Utc>,
) -> Pruned {
    let Some(window) = claims.silence_window() else {
        return Pruned {
            active: sessions.clone(),
            expired: Vec::new(),
        };
    };

    let mut pruned = Pruned::default();
    for (session_id, record) in sessions {
        let expired = record
            .timestamp
            .checked_add_signed(window)
            .is_some_and(|deadline| deadline < now);

        if expired {
            pruned.expired.push(session_id.clone());
        } else {
            pruned.active.insert(session_id.clone(), record.clone());
        }
    }

    pruned
}
