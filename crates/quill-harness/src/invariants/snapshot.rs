//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture the observable state of the system at a point in time.
//! Invariants operate on snapshots rather than live state to ensure
//! consistent, atomic checks.

use quill_app::{App, StreamPhase};
use quill_core::SessionSnapshot;
use quill_proto::ContentItem;

/// Snapshot of the client's observable state.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Session state. `None` if the session was not observed.
    pub session: Option<SessionSnapshot>,
    /// Reconnect budget the session runs with.
    pub max_reconnect_attempts: u32,
    /// Texts of the current selections, in order.
    pub selection_texts: Vec<String>,
    /// Assembler phase.
    pub stream_phase: StreamPhase,
    /// Reply buffer.
    pub stream_buffer: Vec<ContentItem>,
    /// Transcript length at each observation, oldest first.
    pub transcript_history: Vec<usize>,
}

impl SystemSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot of the app's state.
    pub fn from_app(app: &App) -> Self {
        Self {
            selection_texts: app.selections().items().iter().map(|i| i.text.clone()).collect(),
            stream_phase: app.stream().phase(),
            stream_buffer: app.stream().buffer().to_vec(),
            transcript_history: vec![app.transcript().len()],
            ..Self::default()
        }
    }

    /// Attach session state.
    #[must_use]
    pub fn with_session(mut self, session: SessionSnapshot, max_reconnect_attempts: u32) -> Self {
        self.session = Some(session);
        self.max_reconnect_attempts = max_reconnect_attempts;
        self
    }

    /// Replace the transcript history.
    #[must_use]
    pub fn with_transcript_history(mut self, history: impl IntoIterator<Item = usize>) -> Self {
        self.transcript_history = history.into_iter().collect();
        self
    }

    /// Record another transcript length observation.
    pub fn record_transcript(&mut self, len: usize) {
        self.transcript_history.push(len);
    }
}
