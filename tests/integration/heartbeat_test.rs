//! Integration tests for POST /heartbeat.

mod helpers;

use axum::http::StatusCode;
use chrono::{TimeDelta, Utc};
use serde_json::json;

use heartgate_core::traits::SessionStore;
use heartgate_core::types::{HeartbeatClaims, RejectStrategy, SessionRecord};

fn policy(user_id: &str) -> HeartbeatClaims {
    let mut claims = HeartbeatClaims::for_user(user_id);
    claims.asset_id = Some("movie-42".to_string());
    claims.heartbeat_cycle = Some(30);
    claims.cycle_lower_tolerance = Some(5);
    claims.cycle_upper_tolerance = Some(10);
    claims.session_limit = Some(2);
    claims.checking_threshold = Some(3);
    claims.reject_strategy = Some(RejectStrategy::MostRecent);
    claims
}

#[tokio::test]
async fn test_backend_token_starts_session() {
    let app = helpers::TestApp::new();
    let response = app.heartbeat(&app.issue(&policy("alice")), None).await;

    assert_eq!(response.status, StatusCode::OK);
    let claims = app.open(response.token());
    let session_id = claims.session_id.clone().expect("no session id issued");
    assert_eq!(claims.user_id, "alice");
    assert_eq!(claims.started_at, claims.timestamp);
    assert_eq!(claims.session_limit, Some(2));

    let sessions = app.sessions("alice").await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[&session_id].hit_counter, 1);
}

#[tokio::test]
async fn test_immediate_second_heartbeat_is_too_early() {
    let app = helpers::TestApp::new();
    let first = app.heartbeat(&app.issue(&policy("bob")), None).await;
    let second = app.heartbeat(first.token(), None).await;

    assert_eq!(second.status, StatusCode::OK);
    let first_id = app.open(first.token()).session_id;
    let second_id = app.open(second.token()).session_id;
    assert_ne!(first_id, second_id);
    assert_eq!(app.sessions("bob").await.len(), 2);
}

#[tokio::test]
async fn test_on_time_heartbeat_renews_session() {
    let app = helpers::TestApp::new();
    let mut claims = policy("carol");
    claims.heartbeat_cycle = Some(0);
    claims.cycle_lower_tolerance = Some(0);
    claims.cycle_upper_tolerance = Some(60);

    let first = app.heartbeat(&app.issue(&claims), None).await;
    let second = app.heartbeat(first.token(), None).await;
    assert_eq!(second.status, StatusCode::OK);

    let first_claims = app.open(first.token());
    let second_claims = app.open(second.token());
    assert_eq!(first_claims.session_id, second_claims.session_id);
    assert_eq!(first_claims.started_at, second_claims.started_at);

    let sessions = app.sessions("carol").await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions.values().next().map(|r| r.hit_counter), Some(2));
}

#[tokio::test]
async fn test_tampered_token_is_not_acceptable() {
    let app = helpers::TestApp::new();
    let mut token = app.issue(&policy("dave"));
    let last = token.pop().unwrap_or('A');
    token.push(if last == 'A' { 'B' } else { 'A' });

    let response = app.heartbeat(&token, Some(json!(50))).await;

    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(response.body, json!({"error": "Heartbeat token is not valid."}));
    assert_eq!(app.store.applied_actions(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_not_acceptable() {
    let app = helpers::TestApp::new();
    let invalid = json!({"error": "Heartbeat token is not valid."});

    let missing_token = app
        .request("POST", "/heartbeat", Some(json!({"progress": 3})))
        .await;
    assert_eq!(missing_token.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(missing_token.body, invalid);

    let numeric_token = app
        .request("POST", "/heartbeat", Some(json!({"heartbeat_token": 42})))
        .await;
    assert_eq!(numeric_token.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(numeric_token.body, invalid);

    let not_json = app
        .send(
            axum::http::Request::post("/heartbeat")
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from("heartbeat_token=x"))
                .unwrap(),
        )
        .await;
    assert_eq!(not_json.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(not_json.body, invalid);

    let no_content_type = app
        .send(
            axum::http::Request::post("/heartbeat")
                .body(axum::body::Body::from(r#"{"heartbeat_token":"x"}"#))
                .unwrap(),
        )
        .await;
    assert_eq!(no_content_type.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(no_content_type.body, invalid);

    assert_eq!(app.store.applied_actions(), 0);
}

#[tokio::test]
async fn test_limit_exceeded_keeps_only_pruning() {
    let app = helpers::TestApp::new();
    let now = Utc::now();
    let last_seen = now - TimeDelta::seconds(1);
    let record = |minutes_ago: i64| SessionRecord {
        started_at: now - TimeDelta::minutes(minutes_ago),
        timestamp: last_seen,
        hit_counter: 5,
    };
    app.seed(
        "erin",
        vec![
            ("first", record(30)),
            ("second", record(20)),
            ("third", record(10)),
            ("abandoned", SessionRecord::started(now - TimeDelta::hours(2))),
        ],
    )
    .await;

    let mut claims = policy("erin");
    claims.session_id = Some("third".to_string());
    claims.started_at = Some(now - TimeDelta::minutes(10));
    claims.timestamp = Some(last_seen);

    let response = app
        .heartbeat(&app.issue(&claims), Some(json!({"position": 600})))
        .await;

    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        response.body,
        json!({"error": "You have exceeded the maximum allowed number of devices."})
    );

    let sessions = app.sessions("erin").await;
    assert!(!sessions.contains_key("abandoned"));
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions["third"].hit_counter, 5);
    assert_eq!(sessions["third"].timestamp, last_seen);
    assert_eq!(
        app.store.fetch_progress("erin", "movie-42").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_oldest_sessions_are_admitted() {
    let app = helpers::TestApp::new();
    let now = Utc::now();
    let last_seen = now - TimeDelta::seconds(30);
    let record = |minutes_ago: i64| SessionRecord {
        started_at: now - TimeDelta::minutes(minutes_ago),
        timestamp: last_seen,
        hit_counter: 5,
    };
    app.seed(
        "frank",
        vec![("first", record(30)), ("second", record(20)), ("third", record(10))],
    )
    .await;

    let mut claims = policy("frank");
    claims.session_id = Some("first".to_string());
    claims.started_at = Some(now - TimeDelta::minutes(30));
    claims.timestamp = Some(last_seen);

    let response = app.heartbeat(&app.issue(&claims), None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.open(response.token()).session_id.as_deref(), Some("first"));
    assert_eq!(app.sessions("frank").await["first"].hit_counter, 6);
}

#[tokio::test]
async fn test_sessions_edge_rejects_new_device() {
    let app = helpers::TestApp::new();
    let now = Utc::now();
    app.seed(
        "grace",
        vec![
            ("phone", SessionRecord::started(now - TimeDelta::seconds(5))),
            ("tv", SessionRecord::started(now - TimeDelta::seconds(5))),
        ],
    )
    .await;

    let mut claims = policy("grace");
    claims.sessions_edge = Some(1);

    let response = app.heartbeat(&app.issue(&claims), None).await;
    assert_eq!(response.status, StatusCode::PRECONDITION_FAILED);
    assert_eq!(app.sessions("grace").await.len(), 2);
}

#[tokio::test]
async fn test_progress_is_recorded() {
    let app = helpers::TestApp::new();

    let response = app
        .heartbeat(&app.issue(&policy("heidi")), Some(json!({"position": 95})))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        app.store.fetch_progress("heidi", "movie-42").await.unwrap(),
        Some(json!({"position": 95}))
    );

    let response = app.heartbeat(&app.issue(&policy("ivan")), Some(json!(""))).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.fetch_progress("ivan", "movie-42").await.unwrap(), None);
}

#[tokio::test]
async fn test_token_from_another_key_is_not_acceptable() {
    let app = helpers::TestApp::new();
    let foreign = heartgate_token::TokenCodec::new("someone-else")
        .encode(&policy("judy"))
        .unwrap();

    let response = app.heartbeat(&foreign, None).await;
    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    assert!(app.sessions("judy").await.is_empty());
}

#[tokio::test]
async fn test_flush_failure_is_service_unavailable() {
    let app = helpers::TestApp::with_failing_flush();

    let response = app.heartbeat(&app.issue(&policy("kate")), None).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body["error"].is_string());
    assert!(response.body.get("heartbeat_token").is_none());
    assert!(app.sessions("kate").await.is_empty());
}

#[tokio::test]
async fn test_flush_failure_on_rejection_is_service_unavailable() {
    let app = helpers::TestApp::with_failing_flush();
    let now = Utc::now();
    app.seed(
        "leo",
        vec![
            ("phone", SessionRecord::started(now - TimeDelta::seconds(5))),
            ("tv", SessionRecord::started(now - TimeDelta::seconds(5))),
            ("abandoned", SessionRecord::started(now - TimeDelta::hours(2))),
        ],
    )
    .await;

    let mut claims = policy("leo");
    claims.sessions_edge = Some(1);

    let response = app.heartbeat(&app.issue(&claims), None).await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.body["error"].is_string());
    assert!(app.sessions("leo").await.contains_key("abandoned"));
}
