//! Heartbeat handler.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::debug;

use heartgate_core::error::AppError;

use crate::dto::request::HeartbeatBody;
use crate::dto::response::HeartbeatTokenResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /heartbeat
///
/// A body without a usable `heartbeat_token` is refused like an undecodable
/// token.
pub async fn heartbeat(
    State(state): State<AppState>,
    body: Result<Json<HeartbeatBody>, JsonRejection>,
) -> Result<Json<HeartbeatTokenResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Rejecting malformed heartbeat body");
        AppError::invalid_token()
    })?;

    let reply = state.heartbeat_service.process(&body.into()).await?;

    debug!(
        session_id = %reply.session_id,
        new_session = reply.new_session,
        "Heartbeat accepted"
    );

    Ok(Json(reply.into()))
}
