//! Client events and actions.

use std::time::Duration;

use quill_core::{CloseInfo, SessionSnapshot};
use quill_proto::ModelId;

use crate::dispatch::DispatchReport;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Reporting socket lifecycle and inbound text from the transport
/// - Driving time forward via ticks
/// - Forwarding application intents (connect, send, etc.)
#[derive(Debug, Clone)]
pub enum ClientEvent<I = std::time::Instant> {
    /// Application wants a connection.
    Connect,

    /// Application wants a connection with a fresh reconnect budget.
    Retry,

    /// Application wants the socket closed.
    Disconnect,

    /// Application is exiting.
    Shutdown,

    /// Transport finished the open handshake.
    Opened,

    /// Transport closed.
    Closed(CloseInfo),

    /// Transport failed.
    Failed {
        /// Error description.
        message: String,
    },

    /// Text frame received from the server.
    TextReceived(String),

    /// Time tick for reconnect timers.
    Tick {
        /// Current time from the environment.
        now: I,
    },

    /// Application wants to send a chat message.
    Send {
        /// Composed message text.
        content: String,
        /// Target model.
        model: ModelId,
        /// Agent mode flag.
        is_agent: bool,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Open a socket to `url`.
    Open {
        /// Endpoint.
        url: String,
    },

    /// Write a text frame.
    SendText(String),

    /// Close the current socket.
    Close,

    /// A reconnect was scheduled. Informational; ticks fire it.
    ScheduleReconnect {
        /// Delay until the attempt.
        delay: Duration,
        /// 1-based attempt number.
        attempt: u32,
    },

    /// A pending reconnect was cancelled.
    CancelReconnect,

    /// A send was dropped because the socket was not open.
    SendDeferred {
        /// Human-readable reason.
        reason: String,
    },

    /// An inbound frame was dispatched to subscribers.
    Delivered(DispatchReport),

    /// Connection status changed.
    StatusChanged(SessionSnapshot),
}

/// Events reported by a socket transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Open handshake completed.
    Opened,
    /// Text frame received.
    Text(String),
    /// Socket closed.
    Closed(CloseInfo),
    /// Socket failed, either while opening or while open.
    Failed(String),
}
