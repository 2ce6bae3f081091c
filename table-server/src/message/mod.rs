//! Message bus and transports
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  TableBus                   │
//! │  intents ──▶ broadcast::Sender<Intent>      │
//! │  topics  ──▶ DashMap<topic, Sender<Event>>  │
//! └──────────────────┬──────────────────────────┘
//!                    │
//!         ┌──────────┴──────────┐
//!         ▼                     ▼
//!   in-process subscribers   BusTcpServer (framed TCP)
//! ```
//!
//! Delivery is at-least-once and ordered per topic; a lagging subscriber
//! drops old events (bounded channels) and must resync with a status
//! request, never by replay.

pub mod bus;
pub mod handler;
pub mod tcp_server;

pub use bus::{BusError, TableBus};
pub use handler::IntentHandler;
pub use tcp_server::BusTcpServer;

use shared::message::{Frame, FrameError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Read one length-prefixed frame: 1-byte kind + 4-byte LE length + body
pub(crate) async fn read_frame<R: AsyncReadExt + Unpin>(reader: &mut R) -> std::io::Result<Frame> {
    let mut kind_buf = [0u8; 1];
    reader.read_exact(&mut kind_buf).await?;

    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;

    Frame::decode(kind_buf[0], &body)
        .map_err(|e: FrameError| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Write one length-prefixed frame
pub(crate) async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    frame: &Frame,
) -> std::io::Result<()> {
    let body = frame
        .body()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut data = Vec::with_capacity(5 + body.len());
    data.push(frame.kind());
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    data.extend_from_slice(&body);
    writer.write_all(&data).await
}
