//! Error types for the socket session.

use quill_proto::ProtocolError;
use thiserror::Error;

use crate::session::SessionPhase;

/// Errors raised by [`crate::Session`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Socket is not open.
    #[error("not connected")]
    NotConnected,

    /// Operation not allowed in the current phase.
    #[error("invalid state transition: cannot {operation} from {phase:?}")]
    InvalidState {
        /// Phase when the operation was attempted
        phase: SessionPhase,
        /// Operation that was attempted
        operation: String,
    },

    /// Automatic reconnection gave up.
    #[error("reconnect attempts exhausted after {attempts} tries")]
    ReconnectExhausted {
        /// Attempts made before giving up
        attempts: u32,
    },

    /// Encoding or decoding failed.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SessionError {
    /// Returns true if the operation may succeed later without user action.
    ///
    /// `NotConnected` clears once a scheduled reconnect lands. Exhausted
    /// reconnection needs an explicit retry, and protocol errors never
    /// resolve on their own.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NotConnected)
    }
}

impl From<ProtocolError> for SessionError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err.to_string())
    }
}
