//! Client transports
//!
//! The controller talks through [`ClientTransport`]; implementations use
//! interior mutability so a shared handle can send while the run loop
//! receives. Two implementations:
//!
//! - [`TcpClientTransport`]: framed TCP to a remote bus listener
//! - [`MemoryClientTransport`] (feature `in-process`): plugs straight into
//!   a server bus living in the same process

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
#[cfg(feature = "in-process")]
use tokio::sync::broadcast;

use shared::message::{Frame, HelloFrame, IntentMessage, PROTOCOL_VERSION, TopicMessage};

use crate::ClientError;

/// Transport seam between the controller and the bus
#[async_trait]
pub trait ClientTransport: Send + Sync {
    /// Send one intent to the server
    async fn send(&self, intent: IntentMessage) -> Result<(), ClientError>;

    /// Wait for the next event on any subscribed topic
    async fn recv(&self) -> Result<TopicMessage, ClientError>;
}

// ========== TCP transport ==========

/// Framed TCP transport
#[derive(Debug, Clone)]
pub struct TcpClientTransport {
    reader: Arc<Mutex<OwnedReadHalf>>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl TcpClientTransport {
    /// Connect and subscribe to the given topics (e.g. `table/3`, or
    /// `kitchen` for staff dashboards)
    pub async fn connect(
        addr: &str,
        topics: Vec<String>,
        client_name: Option<String>,
    ) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Connection(format!("TCP connect failed: {}", e)))?;
        let (reader, writer) = stream.into_split();
        let transport = Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        };

        let hello = HelloFrame {
            version: PROTOCOL_VERSION,
            client_name,
            topics,
        };
        transport.write_frame(&Frame::Hello(hello)).await?;
        Ok(transport)
    }

    async fn write_frame(&self, frame: &Frame) -> Result<(), ClientError> {
        let body = frame
            .body()
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        let mut data = Vec::with_capacity(5 + body.len());
        data.push(frame.kind());
        data.extend_from_slice(&(body.len() as u32).to_le_bytes());
        data.extend_from_slice(&body);

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&data)
            .await
            .map_err(|e| ClientError::Connection(format!("write failed: {}", e)))
    }

    async fn read_frame(&self) -> Result<Frame, ClientError> {
        let mut reader = self.reader.lock().await;

        let mut kind_buf = [0u8; 1];
        reader
            .read_exact(&mut kind_buf)
            .await
            .map_err(|e| ClientError::Connection(format!("read failed: {}", e)))?;

        let mut len_buf = [0u8; 4];
        reader
            .read_exact(&mut len_buf)
            .await
            .map_err(|e| ClientError::Connection(format!("read failed: {}", e)))?;
        let len = u32::from_le_bytes(len_buf) as usize;

        let mut body = vec![0u8; len];
        reader
            .read_exact(&mut body)
            .await
            .map_err(|e| ClientError::Connection(format!("read failed: {}", e)))?;

        Frame::decode(kind_buf[0], &body).map_err(|e| ClientError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl ClientTransport for TcpClientTransport {
    async fn send(&self, intent: IntentMessage) -> Result<(), ClientError> {
        self.write_frame(&Frame::Intent(intent)).await
    }

    async fn recv(&self) -> Result<TopicMessage, ClientError> {
        loop {
            match self.read_frame().await? {
                Frame::Event(event) => return Ok(event),
                other => {
                    tracing::warn!(kind = other.kind(), "Unexpected frame from server");
                }
            }
        }
    }
}

// ========== In-process transport ==========

/// In-process transport over a server bus's raw channel handles.
///
/// Built from the bus's intent sender and a topic subscription; lagging
/// behind drops old events (the controller resynchronizes with a status
/// request, exactly as over the network).
#[cfg(feature = "in-process")]
pub struct MemoryClientTransport {
    intent_tx: broadcast::Sender<IntentMessage>,
    event_rx: Mutex<broadcast::Receiver<TopicMessage>>,
}

#[cfg(feature = "in-process")]
impl MemoryClientTransport {
    pub fn new(
        intent_tx: broadcast::Sender<IntentMessage>,
        event_rx: broadcast::Receiver<TopicMessage>,
    ) -> Self {
        Self {
            intent_tx,
            event_rx: Mutex::new(event_rx),
        }
    }
}

#[cfg(feature = "in-process")]
#[async_trait]
impl ClientTransport for MemoryClientTransport {
    async fn send(&self, intent: IntentMessage) -> Result<(), ClientError> {
        self.intent_tx
            .send(intent)
            .map(|_| ())
            .map_err(|_| ClientError::Closed)
    }

    async fn recv(&self) -> Result<TopicMessage, ClientError> {
        let mut rx = self.event_rx.lock().await;
        loop {
            match rx.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "In-process transport lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(ClientError::Closed),
            }
        }
    }
}
