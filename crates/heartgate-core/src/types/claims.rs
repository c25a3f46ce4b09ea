//! Claims carried inside a heartbeat token.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Tie-break policy deciding which end of the `started_at` ordering is
/// penalized when a user holds more eligible sessions than allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectStrategy {
    /// Keep the oldest sessions; the most recently started ones are rejected.
    MostRecent,
    /// Keep the newest sessions; the least recently started ones are rejected.
    LeastRecent,
}

impl RejectStrategy {
    /// Parse the wire name, returning `None` for anything unrecognised.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "MOST_RECENT" => Some(Self::MostRecent),
            "LEAST_RECENT" => Some(Self::LeastRecent),
            _ => None,
        }
    }

    /// Wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MostRecent => "MOST_RECENT",
            Self::LeastRecent => "LEAST_RECENT",
        }
    }
}

impl std::fmt::Display for RejectStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded content of a heartbeat token.
///
/// Every policy field is optional. An unset field disables the check it
/// feeds (see the individual accessors), so a partially filled token from
/// an older backend degrades to a permissive heartbeat instead of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatClaims {
    /// Account the heartbeat belongs to.
    pub user_id: String,
    /// Session the client believes it holds. Absent on backend-issued tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Content or resource being played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// Expected seconds between heartbeats.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub heartbeat_cycle: Option<u64>,
    /// Seconds a heartbeat may arrive before the cycle elapses.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub cycle_lower_tolerance: Option<u64>,
    /// Seconds a heartbeat may arrive after the cycle elapses.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub cycle_upper_tolerance: Option<u64>,
    /// Eviction ordering. `None` means the default (newest first).
    #[serde(
        default,
        deserialize_with = "reject_strategy",
        skip_serializing_if = "Option::is_none"
    )]
    pub reject_strategy: Option<RejectStrategy>,
    /// Maximum number of eligible sessions allowed.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_limit: Option<u64>,
    /// Heartbeats a session must accumulate before it counts toward the limit.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub checking_threshold: Option<u64>,
    /// Hard cap on the number of active sessions, eligible or not.
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub sessions_edge: Option<u64>,
    /// When the session was started.
    #[serde(
        default,
        deserialize_with = "lenient::instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
    /// When the token was issued.
    #[serde(
        default,
        deserialize_with = "lenient::instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HeartbeatClaims {
    /// Create claims for a user with no policy fields set.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: None,
            asset_id: None,
            heartbeat_cycle: None,
            cycle_lower_tolerance: None,
            cycle_upper_tolerance: None,
            reject_strategy: None,
            session_limit: None,
            checking_threshold: None,
            sessions_edge: None,
            started_at: None,
            timestamp: None,
        }
    }

    /// How long a session may stay silent before it is pruned:
    /// `heartbeat_cycle + cycle_upper_tolerance`.
    ///
    /// `None` when either part is unset; such sessions are never pruned.
    pub fn silence_window(&self) -> Option<TimeDelta> {
        let total = self
            .heartbeat_cycle?
            .checked_add(self.cycle_upper_tolerance?)?;
        TimeDelta::try_seconds(i64::try_from(total).ok()?)
    }

    /// Shortest accepted gap between two heartbeats of one session:
    /// `heartbeat_cycle - cycle_lower_tolerance`, possibly negative.
    ///
    /// `None` when either part is unset; no heartbeat is then too early.
    pub fn minimum_interval(&self) -> Option<TimeDelta> {
        let cycle = i64::try_from(self.heartbeat_cycle?).ok()?;
        let lower = i64::try_from(self.cycle_lower_tolerance?).ok()?;
        TimeDelta::try_seconds(cycle.checked_sub(lower)?)
    }

    /// Whether the token was minted by the backend rather than returned by us.
    pub fn is_backend_originated(&self) -> bool {
        self.session_id.is_none()
    }
}

fn reject_strategy<'de, D>(deserializer: D) -> Result<Option<RejectStrategy>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(RejectStrategy::from_wire))
}
