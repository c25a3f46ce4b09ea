//! Concurrent session limit.

use serde::Serialize;

use heartgate_core::types::{HeartbeatClaims, RejectStrategy, UserSessionMap};

/// Outcome of the limit check for one heartbeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LimitBreach {
    /// More sessions are active than `sessions_edge` allows.
    pub sessions_edge_exceeded: bool,
    /// The current session sits at or past `session_limit` in the ordered
    /// eligible list.
    pub session_over_limit: bool,
    /// Position of the current session among eligible sessions, if present.
    pub position: Option<usize>,
    /// Number of eligible sessions.
    pub eligible: usize,
    /// Number of active sessions.
    pub active: usize,
}

impl LimitBreach {
    /// Evaluate the limit for `session_id` against the active set.
    pub fn evaluate(
        claims: &HeartbeatClaims,
        active: &UserSessionMap,
        session_id: Option<&str>,
    ) -> Self {
        let ordered = ordered_eligible(claims, active);
        let position = session_id.and_then(|id| ordered.iter().position(|s| *s == id));

        let sessions_edge_exceeded = claims
            .sessions_edge
            .is_some_and(|edge| active.len() as u64 > edge);
        let session_over_limit = match (position, claims.session_limit) {
            (Some(position), Some(limit)) => position as u64 >= limit,
            _ => false,
        };

        Self {
            sessions_edge_exceeded,
            session_over_limit,
            position,
            eligible: ordered.len(),
            active: active.len(),
        }
    }

    /// Whether the heartbeat must be rejected.
    pub fn is_exceeded(&self) -> bool {
        self.sessions_edge_exceeded || self.session_over_limit
    }
}

/// Session ids with `hit_counter >= checking_threshold`, ordered by
/// `started_at` according to the reject strategy.
///
/// `MOST_RECENT` puts the oldest session first so the newest ones fall past
/// the limit; the default puts the newest first. Equal start times keep
/// session id order.
pub fn ordered_eligible<'a>(claims: &HeartbeatClaims, active: &'a UserSessionMap) -> Vec<&'a str> {
    let Some(threshold) = claims.checking_threshold else {
        return Vec::new();
    };

    let mut eligible: Vec<_> = active
        .iter()
        .filter(|(_, record)| record.hit_counter >= threshold)
        .collect();

    match claims.reject_strategy {
        Some(RejectStrategy::MostRecent) => {
            eligible.sort_by(|(_, a), (_, b)| a.started_at.cmp(&b.started_at));
        }
        Some(RejectStrategy::LeastRecent) | None => {
            eligible.sort_by(|(_, a), (_, b)| b.started_at.cmp(&a.started_at));
        }
    }

    eligible.into_iter().map(|(id, _)| id.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, Utc};
    use heartgate_core::types::SessionRecord;

    fn record(started_at: DateTime<Utc>, hits: u64) -> SessionRecord {
        SessionRecord {
            started_at,
            timestamp: started_at,
            hit_counter: hits,
        }
    }

    fn claims(limit: u64, threshold: u64, strategy: Option<RejectStrategy>) -> HeartbeatClaims {
        let mut claims = HeartbeatClaims::for_user("u");
        claims.session_limit = Some(limit);
        claims.checking_threshold = Some(threshold);
        claims.reject_strategy = strategy;
        claims
    }

    /// Three sessions started a minute apart: `old`, `mid`, `new`.
    fn three_sessions(hits: u64) -> UserSessionMap {
        let t0 = Utc::now() - TimeDelta::minutes(10);
        let mut sessions = UserSessionMap::new();
        sessions.insert("old".into(), record(t0, hits));
        sessions.insert("mid".into(), record(t0 + TimeDelta::minutes(1), hits));
        sessions.insert("new".into(), record(t0 + TimeDelta::minutes(2), hits));
        sessions
    }

    #[test]
    fn test_limit_boundary() {
        let sessions = three_sessions(5);
        let claims = claims(2, 3, Some(RejectStrategy::MostRecent));

        assert!(!LimitBreach::evaluate(&claims, &sessions, Some("old")).is_exceeded());
        assert!(!LimitBreach::evaluate(&claims, &sessions, Some("mid")).is_exceeded());

        let breach = LimitBreach::evaluate(&claims, &sessions, Some("new"));
        assert!(breach.session_over_limit);
        assert!(!breach.sessions_edge_exceeded);
        assert_eq!(breach.position, Some(2));
        assert_eq!(breach.eligible, 3);
    }

    #[test]
    fn test_strategy_symmetry() {
        let sessions = three_sessions(5);

        let most_recent = claims(2, 1, Some(RejectStrategy::MostRecent));
        assert_eq!(ordered_eligible(&most_recent, &sessions), vec!["old", "mid", "new"]);

        let least_recent = claims(2, 1, Some(RejectStrategy::LeastRecent));
        assert_eq!(ordered_eligible(&least_recent, &sessions), vec!["new", "mid", "old"]);
        assert!(LimitBreach::evaluate(&least_recent, &sessions, Some("old")).is_exceeded());
        assert!(!LimitBreach::evaluate(&least_recent, &sessions, Some("new")).is_exceeded());

        let default = claims(2, 1, None);
        assert_eq!(ordered_eligible(&default, &sessions), ordered_eligible(&least_recent, &sessions));
    }

    #[test]
    fn test_threshold_filters_young_sessions() {
        let mut sessions = three_sessions(5);
        if let Some(record) = sessions.get_mut("new") {
            record.hit_counter = 2;
        }
        let claims = claims(2, 3, Some(RejectStrategy::MostRecent));

        let breach = LimitBreach::evaluate(&claims, &sessions, Some("new"));
        assert_eq!(breach.position, None);
        assert!(!breach.is_exceeded());
    }

    #[test]
    fn test_unknown_session_is_not_over_limit() {
        let sessions = three_sessions(5);
        let claims = claims(0, 1, None);
        assert!(!LimitBreach::evaluate(&claims, &sessions, None).is_exceeded());
        assert!(LimitBreach::evaluate(&claims, &sessions, Some("old")).is_exceeded());
    }

    #[test]
    fn test_sessions_edge() {
        let sessions = three_sessions(1);
        let mut claims = HeartbeatClaims::for_user("u");

        claims.sessions_edge = Some(3);
        assert!(!LimitBreach::evaluate(&claims, &sessions, Some("old")).is_exceeded());

        claims.sessions_edge = Some(2);
        let breach = LimitBreach::evaluate(&claims, &sessions, Some("old"));
        assert!(breach.sessions_edge_exceeded);
        assert_eq!(breach.active, 3);
    }

    #[test]
    fn test_unset_policy_never_rejects() {
        let sessions = three_sessions(100);
        let claims = HeartbeatClaims::for_user("u");
        let breach = LimitBreach::evaluate(&claims, &sessions, Some("new"));
        assert!(!breach.is_exceeded());
        assert_eq!(breach.eligible, 0);
    }

    #[test]
    fn test_equal_start_times_keep_id_order() {
        let t0 = Utc::now();
        let mut sessions = UserSessionMap::new();
        sessions.insert("b".into(), record(t0, 1));
        sessions.insert("a".into(), record(t0, 1));
        sessions.insert("c".into(), record(t0, 1));

        let claims = claims(1, 1, None);
        assert_eq!(ordered_eligible(&claims, &sessions), vec!["a", "b", "c"]);
    }
}
