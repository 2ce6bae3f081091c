//! Cooldown and course-limit policy
//!
//! Pure functions only. The cooldown duration and the course multiplier are
//! passed in from the settings service on every call; the lock status is
//! always derived from `last_submitted_at`, never from stored flags or
//! client-held timers.

use std::collections::BTreeMap;

use shared::models::{CourseClass, SessionState, TableSession};

/// Remaining cooldown in whole seconds (rounded up); 0 when no submission
/// happened yet or the window has elapsed
pub fn remaining_cooldown(last_submitted_at: Option<i64>, now: i64, cooldown_ms: i64) -> u64 {
    let Some(last) = last_submitted_at else {
        return 0;
    };
    let left_ms = cooldown_ms - (now - last);
    if left_ms <= 0 {
        0
    } else {
        ((left_ms + 999) / 1000) as u64
    }
}

/// Derive the session state. Only all-you-can-eat sessions lock: à la carte
/// tables keep `last_submitted_at` for bookkeeping but never cool down.
pub fn session_state(session: &TableSession, now: i64, cooldown_ms: i64) -> SessionState {
    if session.closed {
        SessionState::Closed
    } else if session.is_all_you_can_eat
        && remaining_cooldown(session.last_submitted_at, now, cooldown_ms) > 0
    {
        SessionState::Locked
    } else {
        SessionState::Open
    }
}

/// Sum of quantities whose product belongs to a restricted (course-limited)
/// category. Products the classifier does not know are counted as
/// restricted: an unclassifiable product must not open a hole in the limit.
pub fn restricted_total<F>(pending: &BTreeMap<i64, u32>, classify: F) -> u32
where
    F: Fn(i64) -> Option<CourseClass>,
{
    pending
        .iter()
        .filter(|(product_id, _)| !classify(**product_id).unwrap_or_default().is_exempt())
        .map(|(_, quantity)| *quantity)
        .sum()
}

/// Split positive-quantity lines into (restricted, exempt)
pub fn partition_by_class<F>(
    pending: &BTreeMap<i64, u32>,
    classify: F,
) -> (Vec<(i64, u32)>, Vec<(i64, u32)>)
where
    F: Fn(i64) -> Option<CourseClass>,
{
    let mut restricted = Vec::new();
    let mut exempt = Vec::new();
    for (product_id, quantity) in pending.iter().filter(|(_, q)| **q > 0) {
        if classify(*product_id).unwrap_or_default().is_exempt() {
            exempt.push((*product_id, *quantity));
        } else {
            restricted.push((*product_id, *quantity));
        }
    }
    (restricted, exempt)
}
