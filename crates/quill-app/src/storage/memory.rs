use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::{StateStore, StorageError};

/// In-memory store for tests and simulation.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let map = self.inner.lock().map_err(|_| StorageError::Io("store lock poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut map =
            self.inner.lock().map_err(|_| StorageError::Io("store lock poisoned".into()))?;
        map.insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut map =
            self.inner.lock().map_err(|_| StorageError::Io("store lock poisoned".into()))?;
        map.remove(key);
        Ok(())
    }
}
