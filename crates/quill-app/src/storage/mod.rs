//! Key-value storage for client state.
//!
//! Synchronous trait, like the rest of the app layer. Two implementations:
//! [`MemoryStore`] for tests and simulation, [`RedbStore`] for durable
//! state across restarts.

mod error;
mod memory;
mod redb;

pub use error::StorageError;
pub use memory::MemoryStore;

pub use self::redb::RedbStore;

/// Byte-oriented key-value store.
///
/// Must be Clone, Send + Sync. Implementations share internal state via
/// `Arc`, so clones see the same data.
pub trait StateStore: Clone + Send + Sync + 'static {
    /// Value stored under `key`, `None` if absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
