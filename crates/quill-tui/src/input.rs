//! Input state and key handling for the TUI.
//!
//! This module owns the text input line (buffer, cursor) and handles
//! character-level key events. Command parsing happens here on Enter.

use quill_app::{App, AppAction, NewSelection, SelectionId, TextDocument};
use quill_proto::ModelId;

use crate::commands::{self, Command};

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key (next model).
    Tab,
    /// Escape key.
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
}

/// Input line state.
///
/// The cursor counts characters, not bytes.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Handle a key input event.
    ///
    /// Returns actions to process (may be empty for input-only keys, or
    /// contain socket actions for commands). Document commands edit `doc`.
    pub fn handle_key(
        &mut self,
        key: KeyInput,
        app: &mut App,
        doc: &mut TextDocument,
    ) -> Vec<AppAction> {
        let len = self.buffer.chars().count();
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_offset(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
                vec![AppAction::Render]
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                vec![AppAction::Render]
            },
            KeyInput::Delete => {
                if self.cursor < len {
                    let at = self.byte_offset(self.cursor);
                    self.buffer.remove(at);
                }
                vec![AppAction::Render]
            },
            KeyInput::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.cursor = (self.cursor + 1).min(len);
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.cursor = 0;
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.cursor = len;
                vec![AppAction::Render]
            },
            KeyInput::Enter => self.handle_enter(app, doc),
            KeyInput::Tab => next_model(app),
            KeyInput::Esc => app.quit(),
            KeyInput::Up | KeyInput::Down => vec![],
        }
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.buffer.char_indices().nth(chars).map_or(self.buffer.len(), |(i, _)| i)
    }

    /// Handle Enter key - parse command and call App API.
    fn handle_enter(&mut self, app: &mut App, doc: &mut TextDocument) -> Vec<AppAction> {
        let text = std::mem::take(&mut self.buffer);
        self.cursor = 0;

        match commands::parse(&text) {
            Command::Message { content } => {
                app.set_draft(content);
                app.submit()
            },
            Command::Select { text } => {
                let mut selection = NewSelection::new(text.as_str());
                if let Some(range) = doc.find(&text) {
                    selection = selection.with_range(range);
                }
                app.add_selection(selection)
            },
            Command::Unselect { id } => app.remove_selection(&SelectionId::new(id)),
            Command::ClearSelection => app.clear_selections(),
            Command::Model { model } => app.select_model(model),
            Command::Models => {
                let tags: Vec<_> = ModelId::ALL.iter().map(|m| m.tag()).collect();
                app.set_status(format!("Models: {}", tags.join(", ")));
                vec![AppAction::Render]
            },
            Command::Agent { enabled } => app.set_agent(enabled),
            Command::Edit { block, text } => {
                if doc.set_block(block, text) {
                    app.document_changed(doc)
                } else {
                    app.set_status(format!("No paragraph {block}"));
                    vec![AppAction::Render]
                }
            },
            Command::Clear => app.clear_transcript(),
            Command::Connect => app.connect(),
            Command::Retry => app.retry(),
            Command::Disconnect => app.disconnect(),
            Command::Quit => app.quit(),
            Command::Unknown { input } => {
                app.set_status(format!("Unknown command: {input}"));
                vec![AppAction::Render]
            },
            Command::InvalidArgs { command, error } => {
                app.set_status(format!("/{command}: {error}"));
                vec![AppAction::Render]
            },
        }
    }
}

/// Cycle to the next model in picker order, wrapping around.
fn next_model(app: &mut App) -> Vec<AppAction> {
    let current = ModelId::ALL.iter().position(|&m| m == app.selected_model()).unwrap_or(0);
    let next = ModelId::ALL[(current + 1) % ModelId::ALL.len()];
    app.select_model(next)
}
