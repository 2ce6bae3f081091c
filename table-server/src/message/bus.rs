//! Topic-addressed message bus
//!
//! One broadcast channel per topic for server-to-client events (ordering is
//! per topic, which is exactly the delivery contract) plus a single intent
//! channel for client-to-server requests. Publishing is a non-blocking
//! channel send: the mutation path never waits on subscribers.

use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{IntentMessage, Topic, TopicMessage};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Bus errors
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    /// No intent handler is running
    #[error("intent channel closed")]
    IntentChannelClosed,
}

/// Topic message bus
#[derive(Debug, Clone)]
pub struct TableBus {
    /// Client-to-server request channel
    intent_tx: broadcast::Sender<IntentMessage>,
    /// Per-topic broadcast senders, created lazily on first use
    topics: Arc<DashMap<String, broadcast::Sender<TopicMessage>>>,
    /// Capacity for every topic channel
    capacity: usize,
    shutdown_token: CancellationToken,
}

impl TableBus {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (intent_tx, _) = broadcast::channel(capacity);
        Self {
            intent_tx,
            topics: Arc::new(DashMap::new()),
            capacity,
            shutdown_token: CancellationToken::new(),
        }
    }

    fn topic_sender(&self, topic: &str) -> broadcast::Sender<TopicMessage> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Publish an event on its topic. Fire-and-forget: a topic without
    /// subscribers just drops the message.
    pub fn publish(&self, msg: TopicMessage) {
        let sender = self.topic_sender(&msg.topic);
        if sender.send(msg).is_err() {
            tracing::trace!("Publish on topic without subscribers");
        }
    }

    /// Subscribe to one topic's events
    pub fn subscribe(&self, topic: &Topic) -> broadcast::Receiver<TopicMessage> {
        self.topic_sender(&topic.to_string()).subscribe()
    }

    /// Send a client request to the server
    pub fn send_intent(&self, intent: IntentMessage) -> Result<(), BusError> {
        self.intent_tx
            .send(intent)
            .map(|_| ())
            .map_err(|_| BusError::IntentChannelClosed)
    }

    /// Subscribe to client requests (intent handler use only)
    pub fn subscribe_intents(&self) -> broadcast::Receiver<IntentMessage> {
        self.intent_tx.subscribe()
    }

    /// Sender handle for in-process clients
    pub fn intent_sender(&self) -> broadcast::Sender<IntentMessage> {
        self.intent_tx.clone()
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// Cancel every task attached to the bus (intent handler, TCP server,
    /// connection loops)
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for TableBus {
    fn default() -> Self {
        Self::new()
    }
}
