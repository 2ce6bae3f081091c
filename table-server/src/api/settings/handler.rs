use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use shared::models::{OrderingSettings, SettingValue};

use crate::core::ServerState;
use crate::utils::{AppResponse, AppResult};

#[derive(Debug, Serialize)]
pub struct SettingEntry {
    pub key: &'static str,
    #[serde(flatten)]
    pub value: SettingValue,
}

/// GET /api/settings
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<SettingEntry>>>> {
    let entries = state
        .settings
        .entries()
        .into_iter()
        .map(|(key, value)| SettingEntry { key, value })
        .collect();
    Ok(Json(AppResponse::success(entries)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

/// PUT /api/settings/{key} - returns the settings after the change
pub async fn update(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> AppResult<Json<AppResponse<OrderingSettings>>> {
    let updated = state.settings.update(&key, &req.value)?;
    Ok(Json(AppResponse::success(updated)))
}
