//! Application state machine.
//!
//! This module defines the [`App`] state machine, which manages the
//! interactive state of the chat assistant completely decoupled from I/O and
//! protocol mechanics.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Owns the draft, the transcript, the selection set and the in-flight
//!   reply.
//! - Tracks the model choice and agent flag, emitting
//!   [`AppAction::Persist`] whenever they change.
//! - Tracks high-level connection state for UI feedback.

use quill_proto::{ModelId, StreamStatus};
use tracing::{debug, warn};

use crate::{
    AppAction, AppEvent, ConnectionState, PersistPolicy, PersistedState,
    document::DocumentSurface,
    highlight::{HighlightReport, on_document_changed, resync},
    selection::{NewSelection, SelectionError, SelectionId, SelectionSet},
    stream::{StreamAssembler, StreamOutcome},
    transcript::Transcript,
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Connection state.
    state: ConnectionState,
    /// Socket endpoint, for display.
    server_url: String,
    /// Text being composed.
    draft: String,
    /// True between submit and the end of the reply.
    is_loading: bool,
    /// Model for the next request.
    selected_model: ModelId,
    /// Agent mode flag.
    is_agent: bool,
    /// Committed messages.
    transcript: Transcript,
    /// Reply in flight.
    stream: StreamAssembler,
    /// Passages attached to the next message.
    selections: SelectionSet,
    /// What [`AppAction::Persist`] carries.
    persist_policy: PersistPolicy,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create a new App for the given endpoint.
    pub fn new(server_url: impl Into<String>, persist_policy: PersistPolicy) -> Self {
        let defaults = PersistedState::default();
        Self {
            state: ConnectionState::default(),
            server_url: server_url.into(),
            draft: String::new(),
            is_loading: false,
            selected_model: defaults.selected_model,
            is_agent: defaults.is_agent,
            transcript: Transcript::new(),
            stream: StreamAssembler::new(),
            selections: SelectionSet::new(),
            persist_policy,
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Apply previously persisted state.
    ///
    /// The transcript is restored only under
    /// [`PersistPolicy::WithTranscript`].
    pub fn restore(&mut self, state: PersistedState) {
        self.selected_model = state.selected_model;
        self.is_agent = state.is_agent;
        if self.persist_policy == PersistPolicy::WithTranscript
            && let Some(transcript) = state.messages
        {
            self.transcript = transcript;
        }
    }

    /// State to write to storage.
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            selected_model: self.selected_model,
            is_agent: self.is_agent,
            messages: match self.persist_policy {
                PersistPolicy::PreferencesOnly => None,
                PersistPolicy::WithTranscript => Some(self.transcript.clone()),
            },
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::ConnectionChanged(state) => {
                if let ConnectionState::Disconnected { error: Some(error), retry_pending, .. } =
                    &state
                {
                    self.status_message = Some(if *retry_pending {
                        format!("Connection lost: {error}. Reconnecting...")
                    } else {
                        format!("Disconnected: {error}")
                    });
                }
                self.state = state;
                vec![AppAction::Render]
            },
            AppEvent::Status(status) => self.handle_status(status),
            AppEvent::Chunk(item) => {
                if !self.stream.on_chunk(item) {
                    return vec![];
                }
                self.is_loading = true;
                vec![AppAction::Render]
            },
            AppEvent::SendDeferred { reason } => {
                self.is_loading = false;
                self.status_message = Some(format!("Message not sent: {reason}"));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_status(&mut self, status: StreamStatus) -> Vec<AppAction> {
        let mut actions = Vec::new();

        match self.stream.on_status(status) {
            StreamOutcome::Armed { flushed } => {
                self.is_loading = true;
                if let Some(content) = flushed
                    && self.transcript.commit(content)
                {
                    actions.extend(self.transcript_changed());
                }
            },
            StreamOutcome::Committed(content) => {
                self.is_loading = false;
                if self.transcript.commit(content) {
                    actions.extend(self.transcript_changed());
                }
            },
            StreamOutcome::Empty => {
                self.is_loading = false;
            },
            StreamOutcome::Discarded { items } => {
                self.is_loading = false;
                warn!(items, "reply failed");
                self.status_message = Some("The assistant reported an error".into());
            },
        }

        actions.push(AppAction::Render);
        actions
    }

    fn transcript_changed(&self) -> Option<AppAction> {
        (self.persist_policy == PersistPolicy::WithTranscript)
            .then(|| AppAction::Persist(self.persisted_state()))
    }

    /// Set a status message to display to the user.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Replace the draft.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Send the draft with the current selections.
    ///
    /// Appends the composed user message, clears draft and selections and
    /// emits [`AppAction::SendChat`]. The draft is sent as typed. Nothing
    /// happens when the composed text is blank or a reply is still loading.
    pub fn submit(&mut self) -> Vec<AppAction> {
        let content = self.selections.compose_submission(&self.draft);
        if content.trim().is_empty() {
            return vec![];
        }
        if self.is_loading {
            self.status_message = Some("Wait for the current reply to finish".into());
            return vec![AppAction::Render];
        }

        debug!(selections = self.selections.len(), chars = content.len(), "submitting message");

        self.transcript.push_user(content.clone());
        self.draft.clear();
        self.selections.clear();
        self.is_loading = true;
        self.status_message = None;

        let mut actions = vec![AppAction::SendChat {
            content,
            model: self.selected_model,
            is_agent: self.is_agent,
        }];
        actions.extend(self.transcript_changed());
        actions.push(AppAction::Render);
        actions
    }

    /// Attach a passage to the next message.
    ///
    /// A duplicate or blank passage leaves the set unchanged and sets a
    /// notice.
    pub fn add_selection(&mut self, selection: NewSelection) -> Vec<AppAction> {
        match self.selections.add(selection) {
            Ok(id) => {
                self.status_message = Some(format!("Added selection {id}"));
            },
            Err(SelectionError::Duplicate { existing }) => {
                self.status_message = Some(format!("Already selected as {existing}"));
            },
            Err(SelectionError::Empty) => {
                self.status_message = Some("Nothing to select".into());
            },
        }
        vec![AppAction::Render]
    }

    /// Drop one selection.
    pub fn remove_selection(&mut self, id: &SelectionId) -> Vec<AppAction> {
        if self.selections.remove(id).is_none() {
            self.status_message = Some(format!("No selection {id}"));
        }
        vec![AppAction::Render]
    }

    /// Drop every selection.
    pub fn clear_selections(&mut self) -> Vec<AppAction> {
        self.selections.clear();
        vec![AppAction::Render]
    }

    /// Re-apply highlights for the current selections.
    pub fn highlight<D: DocumentSurface + ?Sized>(&self, doc: &mut D) -> HighlightReport {
        resync(&self.selections, doc)
    }

    /// React to a document edit. Selections whose text disappeared are
    /// removed, the rest are re-highlighted.
    pub fn document_changed<D: DocumentSurface + ?Sized>(&mut self, doc: &mut D) -> Vec<AppAction> {
        let report = on_document_changed(&mut self.selections, doc);
        if !report.removed.is_empty() {
            self.status_message = Some(format!("Removed {} selection(s)", report.removed.len()));
        }
        vec![AppAction::Render]
    }

    /// Change the model.
    pub fn select_model(&mut self, model: ModelId) -> Vec<AppAction> {
        self.selected_model = model;
        self.status_message = Some(format!("Model: {}", model.label()));
        vec![AppAction::Persist(self.persisted_state()), AppAction::Render]
    }

    /// Switch agent mode.
    pub fn set_agent(&mut self, is_agent: bool) -> Vec<AppAction> {
        self.is_agent = is_agent;
        vec![AppAction::Persist(self.persisted_state()), AppAction::Render]
    }

    /// Empty the transcript.
    pub fn clear_transcript(&mut self) -> Vec<AppAction> {
        self.transcript.clear();
        let mut actions: Vec<_> = self.transcript_changed().into_iter().collect();
        actions.push(AppAction::Render);
        actions
    }

    /// Initiate connection to the server.
    pub fn connect(&self) -> Vec<AppAction> {
        vec![AppAction::Connect, AppAction::Render]
    }

    /// Connect with a fresh reconnect budget.
    pub fn retry(&mut self) -> Vec<AppAction> {
        self.status_message = None;
        vec![AppAction::Retry, AppAction::Render]
    }

    /// Close the connection.
    pub fn disconnect(&self) -> Vec<AppAction> {
        vec![AppAction::Disconnect, AppAction::Render]
    }

    /// Quit the application.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Current connection state.
    pub fn connection_state(&self) -> &ConnectionState {
        &self.state
    }

    /// Socket endpoint.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Text being composed.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// True while waiting for a reply.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Model for the next request.
    pub fn selected_model(&self) -> ModelId {
        self.selected_model
    }

    /// Agent mode flag.
    pub fn is_agent(&self) -> bool {
        self.is_agent
    }

    /// Committed messages.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Reply in flight.
    pub fn stream(&self) -> &StreamAssembler {
        &self.stream
    }

    /// Current selections.
    pub fn selections(&self) -> &SelectionSet {
        &self.selections
    }

    /// Persistence policy.
    pub fn persist_policy(&self) -> PersistPolicy {
        self.persist_policy
    }

    /// Terminal size (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Current status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use quill_proto::{ContentItem, Role};

    use super::*;
    use crate::document::TextDocument;

    fn app() -> App {
        App::new("ws://localhost:8000/ws/chat", PersistPolicy::PreferencesOnly)
    }

    #[test]
    fn submit_composes_and_clears() {
        let mut app = app();
        app.add_selection(NewSelection::new("Revenue grew 12%"));
        app.set_draft("why?");

        let actions = app.submit();

        assert_eq!(actions[0], AppAction::SendChat {
            content: "Revenue grew 12%\n\nwhy?".into(),
            model: ModelId::Claude37,
            is_agent: true,
        });
        assert!(app.is_loading());
        assert!(app.draft().is_empty());
        assert!(app.selections().is_empty());
        assert_eq!(app.transcript().messages()[0].role, Role::User);
    }

    #[test]
    fn draft_sent_as_typed() {
        let mut app = app();
        app.set_draft("  indented\n");

        let actions = app.submit();

        assert!(matches!(
            &actions[0],
            AppAction::SendChat { content, .. } if content == "  indented\n"
        ));
        assert_eq!(app.transcript().messages()[0].content, vec![ContentItem::text("  indented\n")]);
    }

    #[test]
    fn blank_draft_after_selection_still_appended() {
        let mut app = app();
        app.add_selection(NewSelection::new("Revenue grew 12%"));
        app.set_draft(" ");

        let actions = app.submit();

        assert!(matches!(
            &actions[0],
            AppAction::SendChat { content, .. } if content == "Revenue grew 12%\n\n "
        ));
    }

    #[test]
    fn empty_submit_ignored() {
        let mut app = app();
        app.set_draft("   ");
        assert!(app.submit().is_empty());
        assert!(app.transcript().is_empty());
    }

    #[test]
    fn submit_while_loading_refused() {
        let mut app = app();
        app.set_draft("one");
        app.submit();
        app.set_draft("two");

        assert_eq!(app.submit(), vec![AppAction::Render]);
        assert_eq!(app.transcript().len(), 1);
        assert_eq!(app.draft(), "two");
    }

    #[test]
    fn reply_commits_on_complete() {
        let mut app = app();
        app.set_draft("hi");
        app.submit();

        app.handle(AppEvent::Status(StreamStatus::Thinking));
        app.handle(AppEvent::Chunk(ContentItem::text("Hel")));
        app.handle(AppEvent::Chunk(ContentItem::text("lo")));
        app.handle(AppEvent::Status(StreamStatus::Complete));

        assert!(!app.is_loading());
        assert_eq!(app.transcript().len(), 2);
        assert_eq!(app.transcript().messages()[1], quill_proto::ChatMessage::ai(vec![
            ContentItem::text("Hello")
        ]));
        assert!(app.stream().buffer().is_empty());
    }

    #[test]
    fn error_discards_and_notifies() {
        let mut app = app();
        app.handle(AppEvent::Status(StreamStatus::Thinking));
        app.handle(AppEvent::Chunk(ContentItem::text("partial")));
        app.handle(AppEvent::Status(StreamStatus::Error));

        assert!(app.transcript().is_empty());
        assert!(!app.is_loading());
        assert!(app.status_message().is_some());
    }

    #[test]
    fn chunk_outside_reply_ignored() {
        let mut app = app();

        assert!(app.handle(AppEvent::Chunk(ContentItem::text("stray"))).is_empty());
        assert!(!app.is_loading());
        assert!(app.stream().buffer().is_empty());
    }

    #[test]
    fn deferred_send_resets_loading() {
        let mut app = app();
        app.set_draft("hi");
        app.submit();
        app.handle(AppEvent::SendDeferred { reason: "not connected".into() });

        assert!(!app.is_loading());
        assert_eq!(app.status_message(), Some("Message not sent: not connected"));
    }

    #[test]
    fn preference_changes_persist() {
        let mut app = app();
        let actions = app.select_model(ModelId::DeepSeek);
        assert_eq!(actions[0], AppAction::Persist(PersistedState {
            selected_model: ModelId::DeepSeek,
            is_agent: true,
            messages: None,
        }));

        let actions = app.set_agent(false);
        assert!(matches!(&actions[0], AppAction::Persist(s) if !s.is_agent));
    }

    #[test]
    fn transcript_persisted_only_with_policy() {
        let mut plain = app();
        plain.set_draft("hi");
        assert!(!plain.submit().iter().any(|a| matches!(a, AppAction::Persist(_))));

        let mut full = App::new("ws://x", PersistPolicy::WithTranscript);
        full.set_draft("hi");
        let actions = full.submit();
        let persisted = actions.iter().find_map(|a| match a {
            AppAction::Persist(state) => Some(state),
            _ => None,
        });
        assert_eq!(persisted.and_then(|s| s.messages.as_ref()).map(Transcript::len), Some(1));
    }

    #[test]
    fn restore_respects_policy() {
        let mut transcript = Transcript::new();
        transcript.push_user("old");
        let state = PersistedState {
            selected_model: ModelId::Gpt4,
            is_agent: false,
            messages: Some(transcript),
        };

        let mut plain = app();
        plain.restore(state.clone());
        assert_eq!(plain.selected_model(), ModelId::Gpt4);
        assert!(!plain.is_agent());
        assert!(plain.transcript().is_empty());

        let mut full = App::new("ws://x", PersistPolicy::WithTranscript);
        full.restore(state);
        assert_eq!(full.transcript().len(), 1);
    }

    #[test]
    fn duplicate_selection_sets_notice() {
        let mut app = app();
        app.add_selection(NewSelection::new("same"));
        app.add_selection(NewSelection::new("same "));

        assert_eq!(app.selections().len(), 1);
        assert!(app.status_message().is_some_and(|m| m.starts_with("Already selected")));
    }

    #[test]
    fn document_edit_prunes_selections() {
        let mut app = app();
        let mut doc = TextDocument::from_blocks(["Q3 outlook is positive", "Other"]);
        app.add_selection(NewSelection::new("Q3 outlook is positive"));

        doc.set_block(0, "Q3 outlook is uncertain");
        app.document_changed(&mut doc);

        assert!(app.selections().is_empty());
        assert!(doc.highlights().is_empty());
    }

    #[test]
    fn connection_loss_sets_notice() {
        let mut app = app();
        app.handle(AppEvent::ConnectionChanged(ConnectionState::Disconnected {
            reconnect_attempts: 1,
            retry_pending: true,
            error: Some("refused".into()),
        }));
        assert_eq!(app.status_message(), Some("Connection lost: refused. Reconnecting..."));
    }
}
