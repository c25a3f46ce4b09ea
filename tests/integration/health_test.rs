//! Integration tests for the health check endpoint.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_healthcheck_returns_empty_ok() {
    let app = helpers::TestApp::new();
    let response = app.request("GET", "/healthcheck", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.raw.is_empty());
}

#[tokio::test]
async fn test_healthcheck_rejects_post() {
    let app = helpers::TestApp::new();
    let response = app.request("POST", "/healthcheck", None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
