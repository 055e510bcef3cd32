//! Client error types.

use quill_core::SessionError;
use thiserror::Error;

/// Errors returned by [`crate::SocketClient::handle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Session rejected the operation.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

impl ClientError {
    /// Returns true if the operation may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Session(e) => e.is_transient(),
        }
    }
}
