use thiserror::Error;

/// Client-side errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection: {0}")]
    Connection(String),

    /// The transport will not produce any more events
    #[error("transport closed")]
    Closed,

    #[error("protocol: {0}")]
    Protocol(String),
}
