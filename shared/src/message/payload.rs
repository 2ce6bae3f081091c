//! Typed payloads carried inside the message envelopes

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SessionErrorCode;
use crate::models::SessionState;

/// `UPDATE_TEMP`: the full pending order after an accepted mutation, plus
/// everything a client needs to seed its local countdown. Also used as the
/// answer to a `GET_STATUS` intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateTempPayload {
    pub pending_order: BTreeMap<i64, u32>,
    pub last_submitted_at: Option<i64>,
    /// Server-computed cooldown remainder; 0 when no window is running
    pub remaining_secs: u64,
}

/// Status answer on the HTTP resync surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub pending_order: BTreeMap<i64, u32>,
    pub remaining_secs: u64,
    pub state: SessionState,
}

/// `ADD_ITEM_TEMP` / `REMOVE_ITEM_TEMP`: unsigned magnitude, the verb
/// carries the sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustItemPayload {
    pub product_id: i64,
    pub quantity: u32,
}

/// `ORDER_SENT` broadcast (table and kitchen topics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSentPayload {
    pub table_id: i64,
    pub session_id: i64,
}

/// `ERROR` broadcast for rejected operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: SessionErrorCode,
    pub message: String,
}

/// `CONSEGNA_CHANGED` broadcast (kitchen topic only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsegnaChangedPayload {
    pub line_id: i64,
    pub delivered: bool,
}
