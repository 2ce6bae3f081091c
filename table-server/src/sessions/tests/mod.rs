//! Mutation engine test suite
//!
//! Split by concern:
//! - `test_core`: basic adjust/submit/status mechanics
//! - `test_rules`: course limit, cooldown and kitchen-hours gating
//! - `test_flows`: multi-step and concurrent scenarios
//! - `test_boundary`: clamping, rounding and lifecycle edges

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use shared::models::{
    Category, CourseClass, HoursWindow, OrderingSettings, Product, TableSession,
};

use super::manager::SessionManager;
use super::store::{MemorySessionStore, SessionStore, StoreError};
use super::{SessionError, policy};
use crate::message::TableBus;
use crate::orders::{MemoryOrderLog, OrderLog};
use crate::services::{CatalogService, SettingsService};

mod test_flows;
mod test_rules;

/// Settings with the kitchen always open so tests can submit at any wall
/// clock hour
fn test_settings() -> OrderingSettings {
    OrderingSettings {
        cooldown_minutes: 15,
        courses_per_participant: 5,
        kitchen_enabled: true,
        lunch_hours: HoursWindow { opens_at: 0, closes_at: 24 },
        dinner_hours: HoursWindow { opens_at: 0, closes_at: 0 },
    }
}

/// Fixture catalog: two restricted courses, a drink and a dessert
///
/// | id | name        | category        | class      |
/// |----|-------------|-----------------|------------|
/// | 1  | tagliatelle | 5 primi         | Regular    |
/// | 2  | carpaccio   | 6 secondi       | Regular    |
/// | 3  | cola        | 150 bevande     | Exempt     |
/// | 4  | tiramisu    | 160 dolci       | Exempt     |
fn test_catalog() -> Arc<CatalogService> {
    let catalog = CatalogService::new();
    catalog.load(
        vec![
            Product::new(1, "tagliatelle", 5, 9.5),
            Product::new(2, "carpaccio", 6, 12.0),
            Product::new(3, "cola", 150, 3.0),
            Product::new(4, "tiramisu", 160, 5.0),
        ],
        vec![
            Category::new(5, "primi", CourseClass::Regular),
            Category::new(6, "secondi", CourseClass::Regular),
            Category::new(150, "bevande", CourseClass::Exempt),
            Category::new(160, "dolci", CourseClass::Exempt),
        ],
    );
    Arc::new(catalog)
}

pub(crate) struct TestHarness {
    pub manager: Arc<SessionManager>,
    pub store: Arc<MemorySessionStore>,
    pub log: Arc<MemoryOrderLog>,
    pub bus: TableBus,
    pub settings: SettingsService,
}

fn create_harness() -> TestHarness {
    create_harness_with_store(Arc::new(MemorySessionStore::new()))
}

fn create_harness_with_store(store: Arc<MemorySessionStore>) -> TestHarness {
    let settings = SettingsService::new(test_settings());
    let log = Arc::new(MemoryOrderLog::new());
    let bus = TableBus::new();
    let manager = Arc::new(SessionManager::new(
        store.clone() as Arc<dyn SessionStore>,
        test_catalog(),
        settings.clone(),
        log.clone() as Arc<dyn OrderLog>,
        bus.clone(),
    ));
    TestHarness {
        manager,
        store,
        log,
        bus,
        settings,
    }
}

impl TestHarness {
    async fn open_ayce(&self, table_id: i64, participants: u32) -> TableSession {
        self.manager
            .open_session(table_id, true, participants)
            .await
            .expect("open AYCE session")
    }

    async fn open_alacarte(&self, table_id: i64, participants: u32) -> TableSession {
        self.manager
            .open_session(table_id, false, participants)
            .await
            .expect("open session")
    }

    /// Move the table's last submission back in time, as if `secs` seconds
    /// had passed
    async fn rewind_cooldown(&self, table_id: i64, secs: i64) {
        let mut session = self.store.get(table_id).await.expect("session");
        if let Some(ts) = session.last_submitted_at {
            session.last_submitted_at = Some(ts - secs * 1000);
            self.store.save(session).await.expect("rewind save");
        }
    }
}

/// Store wrapper that fails the first N `save` calls with a version
/// conflict, to exercise the engine's transparent retry
pub(crate) struct ConflictingStore {
    inner: MemorySessionStore,
    remaining_failures: AtomicU32,
}

impl ConflictingStore {
    pub fn new(failures: u32) -> Self {
        Self {
            inner: MemorySessionStore::new(),
            remaining_failures: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl SessionStore for ConflictingStore {
    async fn get(&self, table_id: i64) -> Result<TableSession, StoreError> {
        self.inner.get(table_id).await
    }

    async fn save(&self, session: TableSession) -> Result<TableSession, StoreError> {
        let left = self.remaining_failures.load(Ordering::SeqCst);
        if left > 0 {
            self.remaining_failures.store(left - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict(session.table_id));
        }
        self.inner.save(session).await
    }

    async fn open(&self, session: TableSession) -> Result<TableSession, StoreError> {
        self.inner.open(session).await
    }

    async fn close(&self, table_id: i64) -> Result<TableSession, StoreError> {
        self.inner.close(table_id).await
    }
}
