//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the application runtime from specific I/O
//! implementations. Each frontend implements the trait to provide
//! platform-specific I/O, while the generic [`crate::Runtime`] handles all
//! orchestration.

use std::{future::Future, ops::Sub, time::Duration};

use quill_client::TransportEvent;

use crate::{App, AppAction};

/// Abstracts I/O operations for the application runtime.
///
/// Implementations provide platform-specific I/O while the generic
/// [`Runtime`](crate::Runtime) handles orchestration logic. This ensures
/// the same orchestration code runs in the terminal frontend and in
/// simulation.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events, tokio-tungstenite for the socket
/// - **Simulation**: scripted input and injected transport events
///
/// # Associated Types
///
/// - [`Error`](Driver::Error): Platform-specific error type
/// - [`Instant`](Driver::Instant): Time representation (real or virtual)
///
/// Socket failures are not driver errors. They are reported as
/// [`TransportEvent::Failed`] or [`TransportEvent::Closed`] so the session
/// can reconnect; `Error` is reserved for failures the frontend cannot
/// recover from.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Time instant type. Enables virtual time in simulation.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Wait briefly for user input and apply it to `app`.
    ///
    /// Returns the actions the input produced, possibly none.
    fn poll_input(
        &mut self,
        app: &mut App,
    ) -> impl Future<Output = Result<Vec<AppAction>, Self::Error>> + Send;

    /// Start opening a socket to `url`. The outcome arrives later through
    /// [`Driver::recv_transport`].
    fn open(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Write one text frame to the open socket.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Next transport event, if one is ready. Never waits.
    fn recv_transport(&mut self) -> impl Future<Output = Option<TransportEvent>> + Send;

    /// Close the socket, if any.
    fn close(&mut self);

    /// Current time instant.
    fn now(&self) -> Self::Instant;

    /// Render the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release resources.
    fn stop(&mut self);
}
