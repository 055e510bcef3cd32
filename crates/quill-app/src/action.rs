//! Application side-effects and intents.
//!
//! [`AppAction`]s are produced by the [`crate::App`] state machine for the
//! runtime to execute.

use quill_proto::ModelId;

use crate::PersistedState;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Quit the application.
    Quit,

    /// Connect to the server.
    Connect,

    /// Connect with a fresh reconnect budget.
    Retry,

    /// Close the connection.
    Disconnect,

    /// Send a chat message.
    SendChat {
        /// Composed text.
        content: String,
        /// Target model.
        model: ModelId,
        /// Agent mode flag.
        is_agent: bool,
    },

    /// Write state to storage.
    Persist(PersistedState),
}
