//! Observable application state types.
//!
//! View-model structures the frontend renders from. They carry the subset of
//! session state needed for status display, nothing more.

use quill_core::{SessionPhase, SessionSnapshot};

/// Connection state as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket.
    Disconnected {
        /// Consecutive reconnect attempts so far.
        reconnect_attempts: u32,
        /// Whether another attempt is scheduled.
        retry_pending: bool,
        /// Last error, if any.
        error: Option<String>,
    },
    /// Open handshake in flight.
    Connecting,
    /// Socket open.
    Connected,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected { reconnect_attempts: 0, retry_pending: false, error: None }
    }
}

impl ConnectionState {
    /// True when connected.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl From<&SessionSnapshot> for ConnectionState {
    fn from(snapshot: &SessionSnapshot) -> Self {
        match snapshot.phase {
            SessionPhase::Open => Self::Connected,
            SessionPhase::Connecting => Self::Connecting,
            SessionPhase::Idle | SessionPhase::Closed | SessionPhase::ShutDown => {
                Self::Disconnected {
                    reconnect_attempts: snapshot.reconnect_attempts,
                    retry_pending: snapshot.reconnect_pending,
                    error: snapshot.last_error.clone(),
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_snapshot_maps_to_disconnected() {
        let snapshot = SessionSnapshot {
            phase: SessionPhase::Closed,
            reconnect_attempts: 2,
            reconnect_pending: true,
            last_error: Some("refused".into()),
        };
        assert_eq!(
            ConnectionState::from(&snapshot),
            ConnectionState::Disconnected {
                reconnect_attempts: 2,
                retry_pending: true,
                error: Some("refused".into()),
            }
        );
    }
}
