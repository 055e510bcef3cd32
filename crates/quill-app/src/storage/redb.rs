//! Redb-backed durable store.
//!
//! Uses Redb's ACID transactions, so a crash mid-save leaves the previous
//! value intact.

use std::{path::Path, sync::Arc};

use redb::{Database, TableDefinition};

use super::{StateStore, StorageError};

/// Table: client_state
/// Key: state key (e.g. `"chat-storage"`)
/// Value: JSON bytes
const CLIENT_STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("client_state");

/// Durable store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(CLIENT_STATE).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StateStore for RedbStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(CLIENT_STATE).map_err(|e| StorageError::Io(e.to_string()))?;

        let value = table.get(key).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(value.map(|guard| guard.value().to_vec()))
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table =
                txn.open_table(CLIENT_STATE).map_err(|e| StorageError::Io(e.to_string()))?;
            table.insert(key, value).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table =
                txn.open_table(CLIENT_STATE).map_err(|e| StorageError::Io(e.to_string()))?;
            table.remove(key).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            store.save("chat-storage", br#"{"selectedModel":"gpt4"}"#).unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(
            store.load("chat-storage").unwrap(),
            Some(br#"{"selectedModel":"gpt4"}"#.to_vec())
        );
    }

    #[test]
    fn remove_deletes_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("state.redb")).unwrap();

        store.save("k", b"v").unwrap();
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
    }
}
