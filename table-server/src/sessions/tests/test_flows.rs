use super::*;

#[tokio::test]
async fn concurrent_adjusts_on_one_table_never_lose_updates() {
    let h = create_harness();
    h.open_ayce(1, 4).await;

    // Two diners tap + at the same moment, starting from an empty order
    let m1 = h.manager.clone();
    let m2 = h.manager.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { m1.adjust(1, 1, 1).await }),
        tokio::spawn(async move { m2.adjust(1, 1, 1).await }),
    );
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    let session = h.store.get(1).await.unwrap();
    assert_eq!(session.quantity(1), 2);
}

#[tokio::test]
async fn many_concurrent_adjusts_across_tables() {
    let h = create_harness();
    h.open_ayce(1, 10).await;
    h.open_ayce(2, 10).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        for table_id in [1_i64, 2] {
            let manager = h.manager.clone();
            handles.push(tokio::spawn(async move {
                manager.adjust(table_id, 1, 1).await
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(h.store.get(1).await.unwrap().quantity(1), 10);
    assert_eq!(h.store.get(2).await.unwrap().quantity(1), 10);
}

#[tokio::test]
async fn store_conflicts_are_retried_transparently() {
    // The first three write-backs collide with an external writer; the
    // client never notices
    let store = Arc::new(ConflictingStore::new(3));
    let settings = SettingsService::new(test_settings());
    let log = Arc::new(MemoryOrderLog::new());
    let bus = TableBus::new();
    let manager = SessionManager::new(
        store.clone(),
        test_catalog(),
        settings,
        log,
        bus,
    );

    manager.open_session(1, true, 2).await.unwrap();
    let payload = manager.adjust(1, 1, 2).await.unwrap();
    assert_eq!(payload.pending_order.get(&1), Some(&2));
}

#[tokio::test]
async fn full_dining_flow() {
    let h = create_harness();
    let session = h.open_ayce(5, 2).await;

    // First round: two courses and a drink
    h.manager.adjust(5, 1, 2).await.unwrap();
    h.manager.adjust(5, 2, 1).await.unwrap();
    h.manager.adjust(5, 3, 2).await.unwrap();
    h.manager.submit(5).await.unwrap();

    // Locked: courses wait, another drink goes through
    h.manager.adjust(5, 3, 1).await.unwrap();
    h.manager.submit(5).await.unwrap();

    // Window expires, next course round is accepted
    h.rewind_cooldown(5, 901).await;
    h.manager.adjust(5, 1, 1).await.unwrap();
    h.manager.submit(5).await.unwrap();

    let lines = h.log.for_session(session.session_id).await.unwrap();
    assert_eq!(lines.len(), 5);
    let total_quantity: u32 = lines.iter().map(|l| l.quantity).sum();
    assert_eq!(total_quantity, 7);

    h.manager.close_session(5).await.unwrap();
    assert!(matches!(
        h.manager.adjust(5, 1, 1).await.unwrap_err(),
        SessionError::SessionClosed(5)
    ));
}

#[tokio::test]
async fn tables_do_not_share_pending_orders() {
    let h = create_harness();
    h.open_ayce(1, 2).await;
    h.open_ayce(2, 2).await;

    h.manager.adjust(1, 1, 3).await.unwrap();
    h.manager.adjust(2, 1, 1).await.unwrap();

    assert_eq!(h.store.get(1).await.unwrap().quantity(1), 3);
    assert_eq!(h.store.get(2).await.unwrap().quantity(1), 1);

    // Submitting table 1 leaves table 2 untouched
    h.manager.submit(1).await.unwrap();
    assert_eq!(h.store.get(2).await.unwrap().quantity(1), 1);
}
