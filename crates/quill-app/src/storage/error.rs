//! Storage errors.

use thiserror::Error;

/// Errors from a [`super::StateStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend I/O failed.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Stored bytes did not decode.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    /// Returns true if retrying the operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
