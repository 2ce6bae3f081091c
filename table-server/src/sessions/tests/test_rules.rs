use super::*;

use shared::models::SessionState;

// ========== Course limit ==========

#[tokio::test]
async fn course_limit_rejects_prospective_overflow() {
    // participant_count = 2 -> limit 10
    let h = create_harness();
    h.open_ayce(1, 2).await;

    h.manager.adjust(1, 1, 8).await.unwrap();
    let err = h.manager.adjust(1, 1, 3).await.unwrap_err();
    assert!(matches!(err, SessionError::CourseLimitExceeded { limit: 10 }));

    // Rejection left the pending order untouched
    let session = h.store.get(1).await.unwrap();
    assert_eq!(session.quantity(1), 8);
    assert_eq!(session.pending_order.len(), 1);
}

#[tokio::test]
async fn course_limit_counts_every_restricted_category() {
    let h = create_harness();
    h.open_ayce(1, 2).await;

    h.manager.adjust(1, 1, 8).await.unwrap(); // primi
    h.manager.adjust(1, 2, 2).await.unwrap(); // secondi, total 10
    let err = h.manager.adjust(1, 2, 1).await.unwrap_err();
    assert!(matches!(err, SessionError::CourseLimitExceeded { limit: 10 }));
}

#[tokio::test]
async fn exempt_products_bypass_the_limit() {
    let h = create_harness();
    h.open_ayce(1, 1).await; // limit 5

    h.manager.adjust(1, 1, 5).await.unwrap();
    // Drinks are not courses
    h.manager.adjust(1, 3, 20).await.unwrap();
    let session = h.store.get(1).await.unwrap();
    assert_eq!(session.quantity(3), 20);
}

#[tokio::test]
async fn alacarte_sessions_have_no_limit() {
    let h = create_harness();
    h.open_alacarte(1, 1).await;
    h.manager.adjust(1, 1, 40).await.unwrap();
    let session = h.store.get(1).await.unwrap();
    assert_eq!(session.quantity(1), 40);
}

#[tokio::test]
async fn decreases_always_pass_even_when_over_a_lowered_limit() {
    let h = create_harness();
    h.open_ayce(1, 2).await;
    h.manager.adjust(1, 1, 10).await.unwrap();

    // Admin lowers the multiplier mid-session: table is now over the limit,
    // but removing items must still work
    h.settings.update("courses_per_participant", "2").unwrap();
    let payload = h.manager.adjust(1, 1, -1).await.unwrap();
    assert_eq!(payload.pending_order.get(&1), Some(&9));
}

#[tokio::test]
async fn limit_follows_the_settings_multiplier() {
    let h = create_harness();
    h.settings.update("courses_per_participant", "1").unwrap();
    h.open_ayce(1, 3).await; // limit 3

    h.manager.adjust(1, 1, 3).await.unwrap();
    let err = h.manager.adjust(1, 1, 1).await.unwrap_err();
    assert!(matches!(err, SessionError::CourseLimitExceeded { limit: 3 }));
}

// ========== Cooldown ==========

#[tokio::test]
async fn cooldown_blocks_restricted_resubmission_until_expiry() {
    let h = create_harness();
    h.open_ayce(1, 2).await;

    h.manager.adjust(1, 1, 2).await.unwrap();
    h.manager.submit(1).await.unwrap();

    // Within the window: restricted-only submission is rejected with the
    // remaining time
    h.manager.adjust(1, 1, 1).await.unwrap();
    let err = h.manager.submit(1).await.unwrap_err();
    match err {
        SessionError::CooldownActive { remaining_secs } => {
            assert!(remaining_secs > 890 && remaining_secs <= 900, "{remaining_secs}");
        }
        other => panic!("expected CooldownActive, got {other:?}"),
    }

    // After the window has elapsed the identical submission succeeds
    h.rewind_cooldown(1, 901).await;
    h.manager.submit(1).await.unwrap();
}

#[tokio::test]
async fn mixed_categories_rejected_during_cooldown() {
    let h = create_harness();
    h.open_ayce(1, 2).await;
    h.manager.adjust(1, 1, 1).await.unwrap();
    h.manager.submit(1).await.unwrap();

    h.manager.adjust(1, 1, 1).await.unwrap(); // restricted
    h.manager.adjust(1, 3, 2).await.unwrap(); // exempt
    let before = h.store.get(1).await.unwrap().pending_order.clone();

    let err = h.manager.submit(1).await.unwrap_err();
    match err {
        SessionError::MixedCategoriesDuringCooldown { allowed } => {
            assert!(allowed.contains(&"bevande".to_string()));
            assert!(allowed.contains(&"dolci".to_string()));
        }
        other => panic!("expected MixedCategoriesDuringCooldown, got {other:?}"),
    }

    // Nothing changed
    assert_eq!(h.store.get(1).await.unwrap().pending_order, before);
}

#[tokio::test]
async fn exempt_only_submission_bypasses_cooldown_and_preserves_the_window() {
    let h = create_harness();
    let session = h.open_ayce(1, 2).await;
    h.manager.adjust(1, 1, 1).await.unwrap();
    h.manager.submit(1).await.unwrap();
    let window_start = h.store.get(1).await.unwrap().last_submitted_at;

    // Drinks go through while the lock is running
    h.manager.adjust(1, 3, 2).await.unwrap();
    h.manager.submit(1).await.unwrap();

    let stored = h.store.get(1).await.unwrap();
    assert!(stored.pending_order.is_empty());
    // The original window keeps counting: exempt-only submissions do not
    // reset the cooldown
    assert_eq!(stored.last_submitted_at, window_start);

    let status = h.manager.status(1).await.unwrap();
    assert_eq!(status.state, SessionState::Locked);
    assert!(status.remaining_secs > 0);

    // Both submissions are in the history
    let lines = h.log.for_session(session.session_id).await.unwrap();
    assert_eq!(lines.len(), 2);
}

#[tokio::test]
async fn alacarte_sessions_never_cool_down() {
    let h = create_harness();
    h.open_alacarte(1, 4).await;
    h.manager.adjust(1, 1, 1).await.unwrap();
    h.manager.submit(1).await.unwrap();

    // Straight back-to-back submission of courses is fine
    h.manager.adjust(1, 1, 1).await.unwrap();
    h.manager.submit(1).await.unwrap();

    let status = h.manager.status(1).await.unwrap();
    assert_eq!(status.state, SessionState::Open);
}

#[tokio::test]
async fn cooldown_duration_comes_from_settings() {
    let h = create_harness();
    h.settings.update("cooldown_minutes", "1").unwrap();
    h.open_ayce(1, 2).await;

    h.manager.adjust(1, 1, 1).await.unwrap();
    h.manager.submit(1).await.unwrap();

    h.manager.adjust(1, 1, 1).await.unwrap();
    match h.manager.submit(1).await.unwrap_err() {
        SessionError::CooldownActive { remaining_secs } => {
            assert!(remaining_secs <= 60, "{remaining_secs}");
        }
        other => panic!("expected CooldownActive, got {other:?}"),
    }

    h.rewind_cooldown(1, 61).await;
    h.manager.submit(1).await.unwrap();
}

// ========== Kitchen hours ==========

#[tokio::test]
async fn kitchen_disabled_blocks_submissions() {
    let h = create_harness();
    h.open_ayce(1, 2).await;
    h.manager.adjust(1, 1, 1).await.unwrap();

    h.settings.update("kitchen_enabled", "false").unwrap();
    assert!(matches!(
        h.manager.submit(1).await.unwrap_err(),
        SessionError::KitchenClosed
    ));

    // Adjusting the pending order is still allowed
    h.manager.adjust(1, 1, 1).await.unwrap();

    h.settings.update("kitchen_enabled", "true").unwrap();
    h.manager.submit(1).await.unwrap();
}
