//! Application input events.
//!
//! Events originate from two sources:
//! - User-facing system events (ticks, resizes).
//! - Session notifications translated from the client by the bridge.

use quill_proto::{ContentItem, StreamStatus};

use crate::ConnectionState;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Connection status changed.
    ConnectionChanged(ConnectionState),

    /// Stream status from the backend.
    Status(StreamStatus),

    /// Content chunk from the backend.
    Chunk(ContentItem),

    /// A send was dropped because the socket was not open.
    SendDeferred {
        /// Why.
        reason: String,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
