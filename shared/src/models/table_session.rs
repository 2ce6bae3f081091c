//! Table session - the shared pending order for one physical table
//!
//! One session is active per table at a time. Multiple browser clients at
//! the same table mutate the same `pending_order`; the server serializes
//! those mutations and is the single source of truth. Clients hold caches
//! reconciled through status requests and topic broadcasts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Derived session state.
///
/// `Locked` is never stored: it is recomputed from `last_submitted_at` and
/// the configured cooldown on every server-side check (client countdowns are
/// advisory only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Open,
    Locked,
    Closed,
}

/// Table session entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSession {
    pub table_id: i64,
    pub session_id: i64,
    /// All-you-can-eat mode: course limit and cooldown rules apply
    pub is_all_you_can_eat: bool,
    /// Diners at the table, used to compute the course limit
    pub participant_count: u32,
    /// product_id -> quantity; zero-quantity entries are pruned
    pub pending_order: BTreeMap<i64, u32>,
    /// Millis timestamp of the most recent submission; None = no cooldown
    pub last_submitted_at: Option<i64>,
    /// Set when staff closes the session; terminal
    pub closed: bool,
    /// Optimistic-concurrency version, bumped by the store on every write
    #[serde(default)]
    pub version: u64,
}

impl TableSession {
    pub fn new(table_id: i64, session_id: i64, is_all_you_can_eat: bool, participant_count: u32) -> Self {
        Self {
            table_id,
            session_id,
            is_all_you_can_eat,
            participant_count,
            pending_order: BTreeMap::new(),
            last_submitted_at: None,
            closed: false,
            version: 0,
        }
    }

    /// Quantity for a product (0 when absent)
    pub fn quantity(&self, product_id: i64) -> u32 {
        self.pending_order.get(&product_id).copied().unwrap_or(0)
    }

    /// Apply a signed quantity change, clamping at zero and pruning empty
    /// entries. Returns the resulting quantity.
    pub fn apply_delta(&mut self, product_id: i64, delta: i64) -> u32 {
        let current = self.quantity(product_id) as i64;
        let next = (current + delta).max(0) as u32;
        if next == 0 {
            self.pending_order.remove(&product_id);
        } else {
            self.pending_order.insert(product_id, next);
        }
        next
    }

    /// Lines with quantity > 0 (pruning makes this the whole map, but
    /// callers should not rely on that)
    pub fn positive_lines(&self) -> impl Iterator<Item = (i64, u32)> + '_ {
        self.pending_order
            .iter()
            .filter(|(_, q)| **q > 0)
            .map(|(p, q)| (*p, *q))
    }

    pub fn is_empty(&self) -> bool {
        self.positive_lines().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_delta_clamps_at_zero_and_prunes() {
        let mut s = TableSession::new(1, 10, true, 2);
        assert_eq!(s.apply_delta(7, 3), 3);
        assert_eq!(s.apply_delta(7, -5), 0);
        assert!(!s.pending_order.contains_key(&7));
        assert!(s.is_empty());
    }

    #[test]
    fn quantity_defaults_to_zero() {
        let s = TableSession::new(1, 10, false, 4);
        assert_eq!(s.quantity(42), 0);
    }
}
