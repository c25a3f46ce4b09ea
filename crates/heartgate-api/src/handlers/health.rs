//! Health check handler.

use axum::http::StatusCode;

/// GET /healthcheck
pub async fn healthcheck() -> StatusCode {
    StatusCode::OK
}
