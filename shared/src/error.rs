//! Wire-level error codes for rejected session operations
//!
//! The server maps its internal error types onto these codes before
//! broadcasting an `ERROR` event or answering an HTTP request; clients are
//! responsible for localization.

use serde::{Deserialize, Serialize};

/// Session error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionErrorCode {
    /// Prospective restricted-course total would exceed the AYCE limit
    CourseLimitExceeded,
    /// Submit rejected: only restricted items pending during the cooldown
    CooldownActive,
    /// Submit rejected: restricted and exempt items mixed during the cooldown
    MixedCategoriesDuringCooldown,
    /// No session open for the table
    SessionNotFound,
    /// Session exists but has been closed by staff
    SessionClosed,
    /// Submit rejected: no positive-quantity line in the pending order
    EmptyOrder,
    /// Submit rejected: kitchen disabled or outside the active-hours window
    KitchenClosed,
    /// Unknown product in an adjust request
    ProductNotFound,
    /// Anything else (store failures, serialization, ...)
    InternalError,
}
