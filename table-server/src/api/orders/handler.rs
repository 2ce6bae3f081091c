use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::message::{ConsegnaChangedPayload, Topic, TopicMessage};
use shared::models::OrderLine;

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult};

/// GET /api/orders/session/{session_id} - the "storico" view for diners
pub async fn by_session(
    State(state): State<ServerState>,
    Path(session_id): Path<i64>,
) -> AppResult<Json<AppResponse<Vec<OrderLine>>>> {
    let lines = state.order_log.for_session(session_id).await?;
    Ok(Json(AppResponse::success(lines)))
}

/// GET /api/orders/kitchen - undelivered lines, the kitchen queue
pub async fn kitchen_queue(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<OrderLine>>>> {
    let lines = state.order_log.undelivered().await?;
    Ok(Json(AppResponse::success(lines)))
}

#[derive(Debug, Deserialize)]
pub struct SetDeliveredRequest {
    pub delivered: bool,
}

/// PUT /api/orders/{line_id}/delivered
///
/// Kitchen staff flip the flag; every kitchen dashboard hears about it
/// through the `CONSEGNA_CHANGED` broadcast.
pub async fn set_delivered(
    State(state): State<ServerState>,
    Path(line_id): Path<i64>,
    Json(req): Json<SetDeliveredRequest>,
) -> AppResult<Json<AppResponse<OrderLine>>> {
    let line = state.order_log.set_delivered(line_id, req.delivered).await?;

    state.bus.publish(TopicMessage::consegna_changed(
        &Topic::Kitchen,
        &ConsegnaChangedPayload {
            line_id: line.id,
            delivered: line.delivered,
        },
    ));

    Ok(Json(AppResponse::success(line)))
}
