//! Intent handler - dispatches client requests to the mutation engine
//!
//! Long-running background task. Business rejections are published as
//! `ERROR` on the offending table's topic (the shared pending order is
//! untouched); malformed intents are logged and dropped.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use shared::message::{AdjustItemPayload, IntentKind, IntentMessage, Topic, TopicMessage};

use crate::message::TableBus;
use crate::sessions::{SessionError, SessionManager};

/// Server-side intent dispatcher
pub struct IntentHandler {
    receiver: broadcast::Receiver<IntentMessage>,
    manager: Arc<SessionManager>,
    bus: TableBus,
    shutdown_token: CancellationToken,
}

impl IntentHandler {
    pub fn new(
        receiver: broadcast::Receiver<IntentMessage>,
        manager: Arc<SessionManager>,
        bus: TableBus,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            manager,
            bus,
            shutdown_token,
        }
    }

    /// Process intents until shutdown. Spawn this in the background.
    pub async fn run(mut self) {
        tracing::info!("Intent handler started");

        loop {
            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    tracing::info!("Intent handler shutting down");
                    break;
                }

                msg_result = self.receiver.recv() => {
                    match msg_result {
                        Ok(intent) => self.dispatch(intent).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Intent handler lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!("Intent channel closed");
                            break;
                        }
                    }
                }
            }
        }

        tracing::info!("Intent handler stopped");
    }

    async fn dispatch(&self, intent: IntentMessage) {
        let table_id = intent.table_id;
        tracing::debug!(
            request_id = %intent.request_id,
            table_id,
            kind = ?intent.kind,
            "Dispatching intent"
        );

        let result = match intent.kind {
            IntentKind::AddItemTemp => match intent.parse_payload::<AdjustItemPayload>() {
                Ok(p) => self
                    .manager
                    .adjust(table_id, p.product_id, i64::from(p.quantity))
                    .await
                    .map(|_| ()),
                Err(e) => {
                    tracing::warn!(request_id = %intent.request_id, error = %e, "Malformed adjust payload");
                    return;
                }
            },
            IntentKind::RemoveItemTemp => match intent.parse_payload::<AdjustItemPayload>() {
                Ok(p) => self
                    .manager
                    .adjust(table_id, p.product_id, -i64::from(p.quantity))
                    .await
                    .map(|_| ()),
                Err(e) => {
                    tracing::warn!(request_id = %intent.request_id, error = %e, "Malformed adjust payload");
                    return;
                }
            },
            IntentKind::OrderSent => self.manager.submit(table_id).await.map(|_| ()),
            IntentKind::GetStatus => self.manager.broadcast_status(table_id).await,
        };

        if let Err(err) = result {
            self.reject(table_id, &intent, err);
        }
    }

    /// Publish a rejection on the table topic so the offending client can
    /// show it; state was not modified
    fn reject(&self, table_id: i64, intent: &IntentMessage, err: SessionError) {
        tracing::warn!(
            request_id = %intent.request_id,
            table_id,
            kind = ?intent.kind,
            error = %err,
            "Intent rejected"
        );
        self.bus.publish(TopicMessage::error(
            &Topic::Table(table_id),
            &err.to_payload(),
        ));
    }
}
