//! Session state store
//!
//! The authoritative keyed store for per-table sessions. The backend that
//! owns session records is a collaborator; the mutation engine only needs
//! this narrow contract: read a session, write it back with optimistic
//! concurrency, open and close.

use async_trait::async_trait;
use dashmap::DashMap;
use shared::models::TableSession;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no session for table {0}")]
    NotFound(i64),

    #[error("table {0} already has an open session")]
    Occupied(i64),

    /// Version mismatch on write-back; the caller retries with fresh state
    #[error("concurrent modification of table {0}")]
    Conflict(i64),

    #[error("storage backend: {0}")]
    Backend(String),
}

/// Keyed session store contract
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the session for a table
    async fn get(&self, table_id: i64) -> Result<TableSession, StoreError>;

    /// Write a session back. Compare-and-swap on `version`: fails with
    /// [`StoreError::Conflict`] when the stored version moved on, returns
    /// the stored session (version bumped) otherwise.
    async fn save(&self, session: TableSession) -> Result<TableSession, StoreError>;

    /// Create a session for a table. Fails with [`StoreError::Occupied`]
    /// while a non-closed session exists.
    async fn open(&self, session: TableSession) -> Result<TableSession, StoreError>;

    /// Close the table's session: clears the pending order and marks the
    /// session terminal. Returns the closed session.
    async fn close(&self, table_id: i64) -> Result<TableSession, StoreError>;
}

/// In-memory store implementation
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<i64, TableSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, table_id: i64) -> Result<TableSession, StoreError> {
        self.sessions
            .get(&table_id)
            .map(|s| s.value().clone())
            .ok_or(StoreError::NotFound(table_id))
    }

    async fn save(&self, session: TableSession) -> Result<TableSession, StoreError> {
        let mut entry = self
            .sessions
            .get_mut(&session.table_id)
            .ok_or(StoreError::NotFound(session.table_id))?;
        if entry.version != session.version {
            return Err(StoreError::Conflict(session.table_id));
        }
        let mut stored = session;
        stored.version += 1;
        *entry = stored.clone();
        Ok(stored)
    }

    async fn open(&self, session: TableSession) -> Result<TableSession, StoreError> {
        use dashmap::mapref::entry::Entry;
        match self.sessions.entry(session.table_id) {
            Entry::Occupied(mut occupied) => {
                if !occupied.get().closed {
                    return Err(StoreError::Occupied(session.table_id));
                }
                let mut stored = session;
                stored.version = occupied.get().version + 1;
                occupied.insert(stored.clone());
                Ok(stored)
            }
            Entry::Vacant(vacant) => {
                let mut stored = session;
                stored.version = 1;
                vacant.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn close(&self, table_id: i64) -> Result<TableSession, StoreError> {
        let mut entry = self
            .sessions
            .get_mut(&table_id)
            .ok_or(StoreError::NotFound(table_id))?;
        entry.closed = true;
        entry.pending_order.clear();
        entry.version += 1;
        Ok(entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_rejects_stale_versions() {
        let store = MemorySessionStore::new();
        let session = store
            .open(TableSession::new(1, 100, true, 2))
            .await
            .unwrap();

        let fresh = store.get(1).await.unwrap();
        let mut stale = fresh.clone();

        let mut first = fresh;
        first.apply_delta(7, 1);
        store.save(first).await.unwrap();

        stale.apply_delta(7, 1);
        assert!(matches!(
            store.save(stale).await,
            Err(StoreError::Conflict(1))
        ));
        assert_eq!(session.session_id, 100);
    }

    #[tokio::test]
    async fn open_rejects_active_session_and_accepts_after_close() {
        let store = MemorySessionStore::new();
        store.open(TableSession::new(2, 1, false, 4)).await.unwrap();
        assert!(matches!(
            store.open(TableSession::new(2, 2, false, 4)).await,
            Err(StoreError::Occupied(2))
        ));

        let closed = store.close(2).await.unwrap();
        assert!(closed.closed);
        assert!(closed.pending_order.is_empty());

        store.open(TableSession::new(2, 3, true, 2)).await.unwrap();
        let reopened = store.get(2).await.unwrap();
        assert_eq!(reopened.session_id, 3);
        assert!(!reopened.closed);
    }
}
