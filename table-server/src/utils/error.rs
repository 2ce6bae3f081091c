//! Unified HTTP error handling
//!
//! Application-level error type and response envelope for the axum surface:
//! - [`AppError`] - application error enum with an `IntoResponse` mapping
//! - [`AppResponse`] - uniform `{ code, message, data }` response body
//!
//! Business rejections from the mutation engine keep their wire error code
//! (`SessionErrorCode`) so HTTP consumers and bus subscribers see the same
//! vocabulary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::message::ErrorPayload;
use tracing::error;

use crate::orders::LogError;
use crate::sessions::SessionError;
use shared::models::SettingsPatchError;

/// Uniform API response structure
///
/// ```json
/// {
///   "code": "0000",
///   "message": "success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// "0000" on success, an error code otherwise
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> AppResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: "0000".to_string(),
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

/// Application error enum
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Business-rule rejection from the mutation engine; carries the wire
    /// error code so the HTTP body matches the `ERROR` broadcast shape
    #[error("{}", .0.message)]
    Business(ErrorPayload),

    #[error("Internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND".to_string(), msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT".to_string(), msg.clone()),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION".to_string(),
                msg.clone(),
            ),
            AppError::Business(payload) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::to_value(payload.code)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| "BUSINESS_RULE".to_string()),
                payload.message.clone(),
            ),
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL".to_string(),
                    msg.clone(),
                )
            }
        };

        let body = AppResponse::<()> {
            code,
            message,
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::SessionNotFound(table_id) => {
                AppError::NotFound(format!("no session for table {}", table_id))
            }
            SessionError::TableOccupied(table_id) => {
                AppError::Conflict(format!("table {} already has an open session", table_id))
            }
            SessionError::Store(msg) => AppError::Internal(msg),
            other => AppError::Business(other.to_payload()),
        }
    }
}

impl From<LogError> for AppError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::LineNotFound(id) => AppError::NotFound(format!("order line {}", id)),
            LogError::Sink(msg) => AppError::Internal(msg),
        }
    }
}

impl From<SettingsPatchError> for AppError {
    fn from(err: SettingsPatchError) -> Self {
        AppError::Validation(err.to_string())
    }
}
