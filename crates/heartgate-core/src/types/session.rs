//! Per-user session records held by the session store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Last known state of one session of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// When the session was created. Never changes afterwards.
    pub started_at: DateTime<Utc>,
    /// When the last accepted heartbeat arrived.
    pub timestamp: DateTime<Utc>,
    /// Number of accepted heartbeats, starting at 1.
    #[serde(default)]
    pub hit_counter: u64,
}

impl SessionRecord {
    /// Record for a session whose first heartbeat was accepted at `now`.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            timestamp: now,
            hit_counter: 1,
        }
    }

    /// Record after one more accepted heartbeat at `now`.
    pub fn renewed(&self, now: DateTime<Utc>) -> Self {
        Self {
            started_at: self.started_at,
            timestamp: now,
            hit_counter: self.hit_counter.saturating_add(1),
        }
    }
}

/// Sessions of one user keyed by session id.
///
/// A `BTreeMap` keeps iteration order stable, which makes pruning output and
/// tie-breaks between equal `started_at` values deterministic.
pub type UserSessionMap = BTreeMap<String, SessionRecord>;

/// Everything the store knows about a user that a heartbeat needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSessionData {
    /// Sessions currently tracked for the user.
    #[serde(default)]
    pub sessions: UserSessionMap,
}
