use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::message::StatusPayload;
use shared::models::TableSession;

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult};

/// GET /api/tables/{id}/status
///
/// Resync surface for freshly loaded pages; same answer as the
/// `GET_STATUS` intent, minus the broadcast.
pub async fn status(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<AppResponse<StatusPayload>>> {
    let status = state.sessions.status(table_id).await?;
    Ok(Json(AppResponse::success(status)))
}

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    #[serde(default)]
    pub is_all_you_can_eat: bool,
    pub participant_count: u32,
}

/// POST /api/tables/{id}/session - staff opens a dining session
pub async fn open_session(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
    Json(req): Json<OpenSessionRequest>,
) -> AppResult<Json<AppResponse<TableSession>>> {
    let session = state
        .sessions
        .open_session(table_id, req.is_all_you_can_eat, req.participant_count)
        .await?;
    Ok(Json(AppResponse::success(session)))
}

/// DELETE /api/tables/{id}/session - staff closes the session
pub async fn close_session(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<AppResponse<TableSession>>> {
    let session = state.sessions.close_session(table_id).await?;
    Ok(Json(AppResponse::success(session)))
}
