use shared::SessionErrorCode;
use shared::message::ErrorPayload;
use thiserror::Error;

use super::store::StoreError;

/// Mutation engine errors
///
/// Business rejections never touch the pending order; infrastructure
/// failures surface as `Store` and are terminal for the current request.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("course limit reached: {limit}")]
    CourseLimitExceeded { limit: u32 },

    #[error("cooldown active, wait another {remaining_secs}s before sending courses")]
    CooldownActive { remaining_secs: u64 },

    #[error(
        "during the cooldown only these categories can be ordered: {} - remove the other products first",
        allowed.join(", ")
    )]
    MixedCategoriesDuringCooldown { allowed: Vec<String> },

    #[error("no session open for table {0}, wait for staff")]
    SessionNotFound(i64),

    #[error("session for table {0} is closed")]
    SessionClosed(i64),

    #[error("pending order is empty")]
    EmptyOrder,

    #[error("kitchen is closed")]
    KitchenClosed,

    #[error("unknown product: {0}")]
    ProductNotFound(i64),

    #[error("table {0} already has an open session")]
    TableOccupied(i64),

    #[error("session store: {0}")]
    Store(String),
}

pub type SessionResult<T> = Result<T, SessionError>;

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(table_id) => SessionError::SessionNotFound(table_id),
            StoreError::Occupied(table_id) => SessionError::TableOccupied(table_id),
            // Conflicts are retried inside the manager; one leaking out
            // means the retry budget was exhausted
            StoreError::Conflict(table_id) => {
                SessionError::Store(format!("persistent contention on table {}", table_id))
            }
            StoreError::Backend(msg) => SessionError::Store(msg),
        }
    }
}

impl SessionError {
    /// Wire error code for `ERROR` broadcasts and HTTP bodies
    pub fn code(&self) -> SessionErrorCode {
        match self {
            SessionError::CourseLimitExceeded { .. } => SessionErrorCode::CourseLimitExceeded,
            SessionError::CooldownActive { .. } => SessionErrorCode::CooldownActive,
            SessionError::MixedCategoriesDuringCooldown { .. } => {
                SessionErrorCode::MixedCategoriesDuringCooldown
            }
            SessionError::SessionNotFound(_) => SessionErrorCode::SessionNotFound,
            SessionError::SessionClosed(_) => SessionErrorCode::SessionClosed,
            SessionError::EmptyOrder => SessionErrorCode::EmptyOrder,
            SessionError::KitchenClosed => SessionErrorCode::KitchenClosed,
            SessionError::ProductNotFound(_) => SessionErrorCode::ProductNotFound,
            SessionError::TableOccupied(_) | SessionError::Store(_) => {
                SessionErrorCode::InternalError
            }
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload {
            code: self.code(),
            message: self.to_string(),
        }
    }
}
