//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use heartgate_api::{AppState, build_router};
use heartgate_core::config::AppConfig;
use heartgate_core::error::AppError;
use heartgate_core::result::AppResult;
use heartgate_core::traits::SessionStore;
use heartgate_core::types::{
    HeartbeatClaims, PostAction, SessionRecord, UserSessionData, UserSessionMap,
};
use heartgate_service::HeartbeatService;
use heartgate_store::memory::MemorySessionStore;
use heartgate_token::TokenCodec;

/// Shared key used by every test app.
pub const TEST_KEY: &str = "integration-test-key";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store behind the router, for seeding and assertions
    pub store: Arc<MemorySessionStore>,
    /// Codec sharing the router's key
    pub codec: TokenCodec,
}

impl TestApp {
    /// Create a new test application over an empty memory store
    pub fn new() -> Self {
        let store = Arc::new(MemorySessionStore::new());
        Self::build(store.clone(), store)
    }

    /// Create a test application whose store reads fine but never flushes
    ///
    /// Seeding through `store` still works; only the router sees failures.
    pub fn with_failing_flush() -> Self {
        let store = Arc::new(MemorySessionStore::new());
        let failing = Arc::new(FlushFailingStore {
            inner: store.clone(),
        });
        Self::build(store, failing)
    }

    fn build(store: Arc<MemorySessionStore>, backend: Arc<dyn SessionStore>) -> Self {
        let mut config = AppConfig::default();
        config.token.shared_key = TEST_KEY.to_string();

        let codec = TokenCodec::from_config(&config.token);
        let service = HeartbeatService::new(Arc::new(codec.clone()), backend);

        let router = build_router(AppState::new(Arc::new(config), Arc::new(service)));

        Self {
            router,
            store,
            codec,
        }
    }

    /// Seal claims the way the backend would
    pub fn issue(&self, claims: &HeartbeatClaims) -> String {
        self.codec.encode(claims).expect("Failed to encode claims")
    }

    /// Decode a token returned by the router
    pub fn open(&self, token: &str) -> HeartbeatClaims {
        self.codec.decode(token).expect("Failed to decode token")
    }

    /// Write session records for a user directly into the store
    pub async fn seed(&self, user_id: &str, sessions: Vec<(&str, SessionRecord)>) {
        let actions = sessions
            .into_iter()
            .map(|(session_id, record)| PostAction::SetSession {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
                record,
            })
            .collect();
        self.store
            .execute_post_actions(actions)
            .await
            .expect("Failed to seed sessions");
    }

    /// Sessions currently stored for a user
    pub async fn sessions(&self, user_id: &str) -> UserSessionMap {
        self.store
            .fetch_user_session_data(user_id)
            .await
            .expect("Failed to read sessions")
            .sessions
    }

    /// POST /heartbeat with a token and optional progress
    pub async fn heartbeat(&self, token: &str, progress: Option<Value>) -> TestResponse {
        let mut body = serde_json::json!({ "heartbeat_token": token });
        if let Some(progress) = progress {
            body["progress"] = progress;
        }
        self.request("POST", "/heartbeat", Some(body)).await
    }

    /// Make a request against the router
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a prepared request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let raw = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();
        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse { status, body, raw }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body, `Null` if the body is not JSON
    pub body: Value,
    /// Raw body bytes
    pub raw: Vec<u8>,
}

impl TestResponse {
    /// The `heartbeat_token` of a successful response
    pub fn token(&self) -> &str {
        self.body["heartbeat_token"]
            .as_str()
            .expect("Response carries no heartbeat_token")
    }
}

/// Store that serves reads from a memory store and fails every flush
#[derive(Debug)]
pub struct FlushFailingStore {
    inner: Arc<MemorySessionStore>,
}

#[async_trait]
impl SessionStore for FlushFailingStore {
    async fn fetch_user_session_data(&self, user_id: &str) -> AppResult<UserSessionData> {
        self.inner.fetch_user_session_data(user_id).await
    }

    async fn execute_post_actions(&self, _actions: Vec<PostAction>) -> AppResult<()> {
        Err(AppError::store_unavailable("Redis connection reset"))
    }

    async fn fetch_progress(
        &self,
        user_id: &str,
        asset_id: &str,
    ) -> AppResult<Option<Value>> {
        self.inner.fetch_progress(user_id, asset_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}
