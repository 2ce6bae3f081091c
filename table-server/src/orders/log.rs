//! Append-only order log
//!
//! Owned by the order-fulfillment collaborator; the engine appends lines on
//! every accepted submission, kitchen staff flip the delivered flag, and
//! clients query their session's history. Lines are never removed.

use async_trait::async_trait;
use parking_lot::RwLock;
use shared::models::OrderLine;
use thiserror::Error;

/// Order log errors
#[derive(Debug, Error)]
pub enum LogError {
    #[error("order line not found: {0}")]
    LineNotFound(i64),

    #[error("log sink: {0}")]
    Sink(String),
}

/// Append-only sink and query surface for submitted order lines
#[async_trait]
pub trait OrderLog: Send + Sync {
    /// Append submitted lines (one accepted submission = one batch)
    async fn append(&self, lines: &[OrderLine]) -> Result<(), LogError>;

    /// All lines of one dining session, in submission order
    async fn for_session(&self, session_id: i64) -> Result<Vec<OrderLine>, LogError>;

    /// Lines not yet delivered, oldest first (the kitchen queue)
    async fn undelivered(&self) -> Result<Vec<OrderLine>, LogError>;

    /// Flip a line's delivered flag; returns the updated line
    async fn set_delivered(&self, line_id: i64, delivered: bool) -> Result<OrderLine, LogError>;
}

/// In-memory log implementation
#[derive(Debug, Default)]
pub struct MemoryOrderLog {
    lines: RwLock<Vec<OrderLine>>,
}

impl MemoryOrderLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderLog for MemoryOrderLog {
    async fn append(&self, lines: &[OrderLine]) -> Result<(), LogError> {
        self.lines.write().extend_from_slice(lines);
        Ok(())
    }

    async fn for_session(&self, session_id: i64) -> Result<Vec<OrderLine>, LogError> {
        Ok(self
            .lines
            .read()
            .iter()
            .filter(|l| l.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn undelivered(&self) -> Result<Vec<OrderLine>, LogError> {
        Ok(self
            .lines
            .read()
            .iter()
            .filter(|l| !l.delivered)
            .cloned()
            .collect())
    }

    async fn set_delivered(&self, line_id: i64, delivered: bool) -> Result<OrderLine, LogError> {
        let mut lines = self.lines.write();
        let line = lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(LogError::LineNotFound(line_id))?;
        line.delivered = delivered;
        Ok(line.clone())
    }
}
