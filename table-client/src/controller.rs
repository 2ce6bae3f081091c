//! Session controller - the client-side state machine
//!
//! ```text
//! Connecting ──▶ Connected ⇄ Reconnecting
//!                    │
//!                    ▼
//!               Disconnected  (watchdog: request a full reload)
//! ```
//!
//! On connect the controller immediately asks for a status broadcast and
//! reconciles its local view from the answer; afterwards every broadcast on
//! the table topic keeps the view current. A one-second countdown mirrors
//! the cooldown locally (display only - expiry clears the local lock but
//! the server recomputes the authoritative remainder on every check). If no
//! live connection is observed for a whole watchdog interval the controller
//! gives up and requests a full reload: a stale order view that silently
//! came back could submit the wrong food.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use shared::message::{
    AdjustItemPayload, ConsegnaChangedPayload, ErrorPayload, EventKind, IntentMessage,
    TopicMessage, UpdateTempPayload,
};

use crate::error::ClientError;
use crate::transport::ClientTransport;

/// Connection lifecycle of one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
}

/// Controller tuning knobs
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// A connection must be observed at least once per interval, otherwise
    /// the controller requests a full reload
    pub watchdog_interval: Duration,
    /// Pause between receive attempts after a transport error
    pub reconnect_backoff: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            watchdog_interval: Duration::from_secs(10),
            reconnect_backoff: Duration::from_millis(500),
        }
    }
}

/// Local, reconciled copy of the table state. A cache, never authoritative.
#[derive(Debug, Clone, Default)]
pub struct LocalOrderView {
    pub pending_order: BTreeMap<i64, u32>,
    /// Local countdown seed, decremented once per second
    pub remaining_secs: u64,
    /// Local lock flag; display only
    pub locked: bool,
    /// Most recent rejection broadcast, for the notice banner
    pub last_error: Option<ErrorPayload>,
    /// Delivery flag changes seen on the kitchen topic (staff dashboards)
    pub delivery_updates: Vec<ConsegnaChangedPayload>,
}

impl LocalOrderView {
    fn apply_update(&mut self, payload: &UpdateTempPayload) {
        self.pending_order = payload.pending_order.clone();
        self.remaining_secs = payload.remaining_secs;
        self.locked = payload.remaining_secs > 0;
    }

    fn apply_order_sent(&mut self) {
        self.pending_order.clear();
    }

    fn apply_error(&mut self, payload: ErrorPayload) {
        self.last_error = Some(payload);
    }

    /// One countdown step. Reaching zero clears only the local lock; the
    /// server remains the source of truth on the next status or broadcast.
    fn tick(&mut self) {
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
            if self.remaining_secs == 0 {
                self.locked = false;
            }
        }
    }
}

/// Per-client session controller
pub struct SessionController {
    table_id: i64,
    transport: Arc<dyn ClientTransport>,
    config: ControllerConfig,
    view: Arc<RwLock<LocalOrderView>>,
    state: Arc<RwLock<ConnectionState>>,
    reload_requested: Arc<AtomicBool>,
    shutdown_token: CancellationToken,
}

impl SessionController {
    pub fn new(table_id: i64, transport: Arc<dyn ClientTransport>) -> Self {
        Self::with_config(table_id, transport, ControllerConfig::default())
    }

    pub fn with_config(
        table_id: i64,
        transport: Arc<dyn ClientTransport>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            table_id,
            transport,
            config,
            view: Arc::new(RwLock::new(LocalOrderView::default())),
            state: Arc::new(RwLock::new(ConnectionState::Connecting)),
            reload_requested: Arc::new(AtomicBool::new(false)),
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Snapshot of the local view
    pub fn view(&self) -> LocalOrderView {
        self.view.read().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// True once the watchdog decided the page must be reloaded
    pub fn reload_requested(&self) -> bool {
        self.reload_requested.load(Ordering::SeqCst)
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub fn stop(&self) {
        self.shutdown_token.cancel();
    }

    // ========== Intents ==========

    pub async fn add_item(&self, product_id: i64, quantity: u32) -> Result<(), ClientError> {
        self.send(IntentMessage::add_item(
            self.table_id,
            &AdjustItemPayload { product_id, quantity },
        ))
        .await
    }

    pub async fn remove_item(&self, product_id: i64, quantity: u32) -> Result<(), ClientError> {
        self.send(IntentMessage::remove_item(
            self.table_id,
            &AdjustItemPayload { product_id, quantity },
        ))
        .await
    }

    pub async fn submit(&self) -> Result<(), ClientError> {
        self.send(IntentMessage::submit(self.table_id)).await
    }

    pub async fn request_status(&self) -> Result<(), ClientError> {
        self.send(IntentMessage::get_status(self.table_id)).await
    }

    async fn send(&self, intent: IntentMessage) -> Result<(), ClientError> {
        match self.transport.send(intent).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(table_id = self.table_id, error = %e, "Intent send failed");
                self.set_state(ConnectionState::Reconnecting);
                Err(e)
            }
        }
    }

    // ========== Event loop ==========

    /// Receive broadcasts, run the countdown and the watchdog until
    /// shutdown or forced reload
    pub async fn run(&self) {
        // Freshly connected: reconcile instead of assuming an empty order
        if self.request_status().await.is_ok() {
            self.set_state(ConnectionState::Connected);
        }

        let start = tokio::time::Instant::now();
        let mut countdown =
            tokio::time::interval_at(start + Duration::from_secs(1), Duration::from_secs(1));
        let mut watchdog = tokio::time::interval_at(
            start + self.config.watchdog_interval,
            self.config.watchdog_interval,
        );

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    self.set_state(ConnectionState::Disconnected);
                    break;
                }

                _ = countdown.tick() => {
                    self.view.write().tick();
                }

                _ = watchdog.tick() => {
                    if self.connection_state() != ConnectionState::Connected {
                        tracing::warn!(
                            table_id = self.table_id,
                            "No live connection within the watchdog interval, requesting reload"
                        );
                        self.reload_requested.store(true, Ordering::SeqCst);
                        self.set_state(ConnectionState::Disconnected);
                        break;
                    }
                }

                event = self.transport.recv() => {
                    match event {
                        Ok(msg) => {
                            if self.connection_state() != ConnectionState::Connected {
                                // Back after a gap: broadcasts may have been
                                // missed, reconcile from scratch
                                self.set_state(ConnectionState::Connected);
                                let _ = self.request_status().await;
                            }
                            self.handle_event(msg).await;
                        }
                        Err(e) => {
                            tracing::warn!(table_id = self.table_id, error = %e, "Receive failed");
                            self.set_state(ConnectionState::Reconnecting);
                            tokio::time::sleep(self.config.reconnect_backoff).await;
                        }
                    }
                }
            }
        }
    }

    async fn handle_event(&self, msg: TopicMessage) {
        match msg.event_type {
            EventKind::UpdateTemp => match msg.parse_payload::<UpdateTempPayload>() {
                Ok(payload) => self.view.write().apply_update(&payload),
                Err(e) => tracing::warn!(error = %e, "Malformed UPDATE_TEMP payload"),
            },
            EventKind::OrderSent => {
                self.view.write().apply_order_sent();
                // The server owns the cooldown; fetch the authoritative
                // remainder instead of guessing a duration
                let _ = self.request_status().await;
            }
            EventKind::Error => match msg.parse_payload::<ErrorPayload>() {
                Ok(payload) => {
                    tracing::warn!(code = ?payload.code, message = %payload.message, "Rejected");
                    self.view.write().apply_error(payload);
                }
                Err(e) => tracing::warn!(error = %e, "Malformed ERROR payload"),
            },
            EventKind::ConsegnaChanged => match msg.parse_payload::<ConsegnaChangedPayload>() {
                Ok(payload) => self.view.write().delivery_updates.push(payload),
                Err(e) => tracing::warn!(error = %e, "Malformed CONSEGNA_CHANGED payload"),
            },
        }
    }

    fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.write();
        if *state != next {
            tracing::debug!(table_id = self.table_id, from = ?*state, to = ?next, "Connection state");
            *state = next;
        }
    }
}
