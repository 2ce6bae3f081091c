//! Submitted order line (comanda)
//!
//! One line per product of a submitted order. Lines are append-only; the
//! kitchen flips `delivered` as dishes go out.

use serde::{Deserialize, Serialize};

/// A single kitchen-ticket line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub session_id: i64,
    pub table_id: i64,
    pub product_id: i64,
    /// Name snapshot at submission time (catalog renames must not rewrite
    /// history)
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
    /// Millis timestamp of the submission that produced this line
    pub submitted_at: i64,
    #[serde(default)]
    pub delivered: bool,
}
