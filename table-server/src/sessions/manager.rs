//! SessionManager - serialized per-table mutation engine
//!
//! # Operation flow
//!
//! ```text
//! adjust/submit(table_id, ...)
//!     ├─ 1. Acquire the table's mutation lock
//!     ├─ 2. Read the session from the store
//!     ├─ 3. Validate business rules (course limit, cooldown, kitchen hours)
//!     ├─ 4. Write back (CAS, transparent retry on conflict)
//!     ├─ 5. Append submitted lines to the order log (submit only)
//!     └─ 6. Broadcast on the table topic (and kitchen topic for submits)
//! ```
//!
//! Steps 2-5 are the critical section; broadcasting is a non-blocking
//! channel send, so slow subscribers never stall the mutation path.
//! Operations on different tables run in parallel.

use std::sync::Arc;

use chrono::Timelike;
use dashmap::DashMap;
use tokio::sync::Mutex;

use shared::message::{OrderSentPayload, StatusPayload, Topic, TopicMessage, UpdateTempPayload};
use shared::models::{OrderLine, TableSession};
use shared::util::{now_millis, snowflake_id};

use super::policy;
use super::store::{SessionStore, StoreError};
use super::{SessionError, SessionResult};
use crate::message::TableBus;
use crate::orders::OrderLog;
use crate::services::{CatalogService, SettingsService};

/// Retry budget for optimistic-concurrency conflicts on the store.
/// Conflicts only happen when an external writer (session lifecycle) races
/// a mutation; within the engine the per-table lock already serializes.
const MAX_CONFLICT_RETRIES: u32 = 8;

/// Serialized mutation engine for table sessions
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    catalog: Arc<CatalogService>,
    settings: SettingsService,
    order_log: Arc<dyn OrderLog>,
    bus: TableBus,
    /// Per-table mutation locks: at most one in-flight mutation per table
    table_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        catalog: Arc<CatalogService>,
        settings: SettingsService,
        order_log: Arc<dyn OrderLog>,
        bus: TableBus,
    ) -> Self {
        Self {
            store,
            catalog,
            settings,
            order_log,
            bus,
            table_locks: DashMap::new(),
        }
    }

    fn table_lock(&self, table_id: i64) -> Arc<Mutex<()>> {
        self.table_locks
            .entry(table_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Open a session for a table (session lifecycle surface)
    pub async fn open_session(
        &self,
        table_id: i64,
        is_all_you_can_eat: bool,
        participant_count: u32,
    ) -> SessionResult<TableSession> {
        let lock = self.table_lock(table_id);
        let _guard = lock.lock().await;

        let session = TableSession::new(
            table_id,
            snowflake_id(),
            is_all_you_can_eat,
            participant_count.max(1),
        );
        let stored = self.store.open(session).await?;
        tracing::info!(
            table_id,
            session_id = stored.session_id,
            is_all_you_can_eat,
            participant_count = stored.participant_count,
            "Session opened"
        );
        Ok(stored)
    }

    /// Close a table's session: terminal, clears the pending order. The
    /// submitted order log is untouched.
    pub async fn close_session(&self, table_id: i64) -> SessionResult<TableSession> {
        let lock = self.table_lock(table_id);
        let _guard = lock.lock().await;

        let closed = self.store.close(table_id).await?;
        tracing::info!(table_id, session_id = closed.session_id, "Session closed");
        Ok(closed)
    }

    /// Apply a signed quantity change to the table's pending order.
    ///
    /// Rejections leave the pending order untouched; an accepted change is
    /// broadcast as `UPDATE_TEMP` on the table topic.
    pub async fn adjust(
        &self,
        table_id: i64,
        product_id: i64,
        delta: i64,
    ) -> SessionResult<UpdateTempPayload> {
        let lock = self.table_lock(table_id);
        let _guard = lock.lock().await;

        let meta = self
            .catalog
            .product_meta(product_id)
            .ok_or(SessionError::ProductNotFound(product_id))?;
        let settings = self.settings.current();

        let mut attempts = 0;
        loop {
            let session = self.store.get(table_id).await?;
            if session.closed {
                return Err(SessionError::SessionClosed(table_id));
            }

            let mut updated = session;
            let before = updated.quantity(product_id);
            let after = updated.apply_delta(product_id, delta);
            let effective = i64::from(after) - i64::from(before);

            // Course limit on the prospective restricted total; decreases
            // always pass so a lowered limit can never trap a table
            if updated.is_all_you_can_eat && !meta.course_class.is_exempt() && effective > 0 {
                let limit = settings.course_limit(updated.participant_count);
                let prospective =
                    policy::restricted_total(&updated.pending_order, |pid| {
                        self.catalog.course_class_of(pid)
                    });
                if prospective > limit {
                    tracing::debug!(table_id, product_id, delta, limit, "Course limit exceeded");
                    return Err(SessionError::CourseLimitExceeded { limit });
                }
            }

            match self.store.save(updated).await {
                Ok(saved) => {
                    let now = now_millis();
                    let payload = UpdateTempPayload {
                        pending_order: saved.pending_order.clone(),
                        last_submitted_at: saved.last_submitted_at,
                        remaining_secs: policy::remaining_cooldown(
                            saved.last_submitted_at,
                            now,
                            settings.cooldown_millis(),
                        ),
                    };
                    self.bus
                        .publish(TopicMessage::update_temp(&Topic::Table(table_id), &payload));
                    tracing::debug!(table_id, product_id, delta, quantity = after, "Adjusted");
                    return Ok(payload);
                }
                Err(StoreError::Conflict(_)) if attempts < MAX_CONFLICT_RETRIES => {
                    attempts += 1;
                    tracing::debug!(table_id, attempts, "Store conflict on adjust, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Submit the table's pending order.
    ///
    /// During an active cooldown on an all-you-can-eat session only
    /// exempt-category items may go through; exempt-only submissions keep
    /// the original cooldown window running (`last_submitted_at` is
    /// preserved, not reset).
    pub async fn submit(&self, table_id: i64) -> SessionResult<OrderSentPayload> {
        let lock = self.table_lock(table_id);
        let _guard = lock.lock().await;

        let settings = self.settings.current();
        let mut attempts = 0;
        loop {
            let session = self.store.get(table_id).await?;
            if session.closed {
                return Err(SessionError::SessionClosed(table_id));
            }
            if session.is_empty() {
                return Err(SessionError::EmptyOrder);
            }

            let now = now_millis();
            let local_hour = chrono::Local::now().hour() as u8;
            if !settings.kitchen_open(local_hour) {
                return Err(SessionError::KitchenClosed);
            }

            let remaining =
                policy::remaining_cooldown(session.last_submitted_at, now, settings.cooldown_millis());
            let locked = session.is_all_you_can_eat && remaining > 0;

            let (restricted, exempt) =
                policy::partition_by_class(&session.pending_order, |pid| {
                    self.catalog.course_class_of(pid)
                });

            if locked && !restricted.is_empty() {
                if !exempt.is_empty() {
                    return Err(SessionError::MixedCategoriesDuringCooldown {
                        allowed: self.catalog.exempt_category_names(),
                    });
                }
                return Err(SessionError::CooldownActive {
                    remaining_secs: remaining,
                });
            }

            let lines = self.build_lines(&session, now)?;

            let mut updated = session;
            updated.pending_order.clear();
            // Exempt-only submit during a running window: keep the original
            // window; everything else stamps a fresh one
            if !(locked && restricted.is_empty()) {
                updated.last_submitted_at = Some(now);
            }

            match self.store.save(updated).await {
                Ok(saved) => {
                    self.order_log
                        .append(&lines)
                        .await
                        .map_err(|e| SessionError::Store(e.to_string()))?;

                    let payload = OrderSentPayload {
                        table_id,
                        session_id: saved.session_id,
                    };
                    self.bus
                        .publish(TopicMessage::order_sent(&Topic::Table(table_id), &payload));
                    self.bus
                        .publish(TopicMessage::order_sent(&Topic::Kitchen, &payload));
                    tracing::info!(
                        table_id,
                        session_id = saved.session_id,
                        lines = lines.len(),
                        "Order submitted"
                    );
                    return Ok(payload);
                }
                Err(StoreError::Conflict(_)) if attempts < MAX_CONFLICT_RETRIES => {
                    attempts += 1;
                    tracing::debug!(table_id, attempts, "Store conflict on submit, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Current status of a table's session: what a (re)connecting client
    /// needs to rebuild its local view. Read-only and idempotent.
    pub async fn status(&self, table_id: i64) -> SessionResult<StatusPayload> {
        let session = self.store.get(table_id).await?;
        if session.closed {
            return Err(SessionError::SessionClosed(table_id));
        }
        let settings = self.settings.current();
        let now = now_millis();
        Ok(StatusPayload {
            pending_order: session.pending_order.clone(),
            remaining_secs: policy::remaining_cooldown(
                session.last_submitted_at,
                now,
                settings.cooldown_millis(),
            ),
            state: policy::session_state(&session, now, settings.cooldown_millis()),
        })
    }

    /// Answer a `GET_STATUS` intent: publish the current state as an
    /// `UPDATE_TEMP` on the table topic so every subscriber reconciles
    pub async fn broadcast_status(&self, table_id: i64) -> SessionResult<()> {
        let session = self.store.get(table_id).await?;
        if session.closed {
            return Err(SessionError::SessionClosed(table_id));
        }
        let settings = self.settings.current();
        let payload = UpdateTempPayload {
            pending_order: session.pending_order.clone(),
            last_submitted_at: session.last_submitted_at,
            remaining_secs: policy::remaining_cooldown(
                session.last_submitted_at,
                now_millis(),
                settings.cooldown_millis(),
            ),
        };
        self.bus
            .publish(TopicMessage::update_temp(&Topic::Table(table_id), &payload));
        Ok(())
    }

    /// Kitchen-ticket lines for every positive-quantity pending entry, with
    /// name and price snapshotted from the catalog
    fn build_lines(&self, session: &TableSession, submitted_at: i64) -> SessionResult<Vec<OrderLine>> {
        session
            .positive_lines()
            .map(|(product_id, quantity)| {
                let meta = self
                    .catalog
                    .product_meta(product_id)
                    .ok_or(SessionError::ProductNotFound(product_id))?;
                Ok(OrderLine {
                    id: snowflake_id(),
                    session_id: session.session_id,
                    table_id: session.table_id,
                    product_id,
                    product_name: meta.name,
                    quantity,
                    unit_price: meta.price,
                    submitted_at,
                    delivered: false,
                })
            })
            .collect()
    }
}
