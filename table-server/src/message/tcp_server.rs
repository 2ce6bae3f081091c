//! TCP bus listener
//!
//! Network clients speak the framed protocol from `shared::message`: a
//! hello frame naming the topics they want forwarded, then intents upstream
//! and topic events downstream. One forwarding task per subscribed topic,
//! one read loop per connection, everything cancelled through the bus
//! shutdown token.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use shared::message::{Frame, HelloFrame, PROTOCOL_VERSION, Topic};

use super::{TableBus, read_frame, write_frame};

/// TCP front end for the table bus
pub struct BusTcpServer {
    bus: TableBus,
    listen_addr: String,
}

impl BusTcpServer {
    pub fn new(bus: TableBus, listen_addr: String) -> Self {
        Self { bus, listen_addr }
    }

    /// Accept connections until the bus shuts down
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!(addr = %self.listen_addr, "Bus TCP server listening");

        let shutdown_token = self.bus.shutdown_token().clone();
        loop {
            tokio::select! {
                _ = shutdown_token.cancelled() => {
                    tracing::info!("Bus TCP server shutting down");
                    break;
                }

                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            tracing::info!(%addr, "Bus client connected");
                            let bus = self.bus.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, bus).await {
                                    tracing::info!(%addr, error = %e, "Bus client disconnected");
                                }
                            });
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    bus: TableBus,
) -> std::io::Result<()> {
    let (mut reader, writer) = stream.into_split();
    let writer = Arc::new(Mutex::new(writer));
    let shutdown_token = bus.shutdown_token().clone();

    // First frame must be the hello naming the wanted topics
    let hello = match read_frame(&mut reader).await? {
        Frame::Hello(h) => h,
        other => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("expected hello frame, got kind {}", other.kind()),
            ));
        }
    };
    check_hello(&hello)?;

    for name in &hello.topics {
        let Some(topic) = Topic::parse(name) else {
            tracing::warn!(topic = %name, "Ignoring unknown topic in hello");
            continue;
        };
        let rx = bus.subscribe(&topic);
        tokio::spawn(forward_topic(
            rx,
            writer.clone(),
            shutdown_token.clone(),
        ));
    }

    // Upstream: intents from the client
    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => break,
            frame = read_frame(&mut reader) => {
                match frame? {
                    Frame::Intent(intent) => {
                        if let Err(e) = bus.send_intent(intent) {
                            tracing::warn!(error = %e, "Dropping intent");
                        }
                    }
                    other => {
                        tracing::warn!(kind = other.kind(), "Unexpected frame from client");
                    }
                }
            }
        }
    }

    Ok(())
}

fn check_hello(hello: &HelloFrame) -> std::io::Result<()> {
    if hello.version != PROTOCOL_VERSION {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "protocol version mismatch: client {}, server {}",
                hello.version, PROTOCOL_VERSION
            ),
        ));
    }
    Ok(())
}

/// Forward one topic's events to a connected client until it drops or the
/// bus shuts down
async fn forward_topic(
    mut rx: broadcast::Receiver<shared::message::TopicMessage>,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    shutdown_token: tokio_util::sync::CancellationToken,
) {
    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => break,
            msg = rx.recv() => {
                match msg {
                    Ok(event) => {
                        let mut w = writer.lock().await;
                        if write_frame(&mut *w, &Frame::Event(event)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Topic forwarder lagged, client must resync");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}
