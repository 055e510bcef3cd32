//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. The socket is a
//! [`WsConnection`] over tokio-tungstenite.

use std::{
    collections::VecDeque,
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use quill_app::{App, AppAction, AppEvent, Driver, TextDocument};
use quill_client::{TransportEvent, transport::WsConnection};
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{InputState, KeyInput, ui};

/// How long `poll_input` waits for a key before ticking.
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Handles terminal I/O (crossterm), rendering (ratatui), and the socket.
/// Owns the input line and the document the user selects passages from.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    connection: Option<WsConnection>,
    /// Socket finishing its close handshake. Its events are not read.
    closing: Option<WsConnection>,
    /// Transport events produced locally, ahead of the socket's own.
    pending: VecDeque<TransportEvent>,
    input_state: InputState,
    document: TextDocument,
}

impl TerminalDriver {
    /// Enter raw mode and the alternate screen.
    pub fn new(document: TextDocument) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            event_stream: EventStream::new(),
            connection: None,
            closing: None,
            pending: VecDeque::new(),
            input_state: InputState::new(),
            document,
        })
    }

    /// Convert crossterm `KeyCode` to `KeyInput`.
    fn convert_key(code: KeyCode) -> Option<KeyInput> {
        match code {
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Delete => Some(KeyInput::Delete),
            KeyCode::Tab => Some(KeyInput::Tab),
            KeyCode::Esc => Some(KeyInput::Esc),
            KeyCode::Left => Some(KeyInput::Left),
            KeyCode::Right => Some(KeyInput::Right),
            KeyCode::Up => Some(KeyInput::Up),
            KeyCode::Down => Some(KeyInput::Down),
            KeyCode::Home => Some(KeyInput::Home),
            KeyCode::End => Some(KeyInput::End),
            _ => None,
        }
    }
}

impl Driver for TerminalDriver {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_input(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        tokio::select! {
            biased;

            maybe_event = self.event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                        Ok(Self::convert_key(key_event.code).map_or_else(Vec::new, |key| {
                            self.input_state.handle_key(key, app, &mut self.document)
                        }))
                    },
                    Some(Ok(Event::Resize(cols, rows))) => {
                        Ok(app.handle(AppEvent::Resize(cols, rows)))
                    },
                    Some(Err(e)) => Err(TerminalError::Io(e)),
                    _ => Ok(vec![]),
                }
            }

            () = tokio::time::sleep(INPUT_POLL_INTERVAL) => {
                Ok(app.handle(AppEvent::Tick))
            }
        }
    }

    async fn open(&mut self, url: &str) -> Result<(), Self::Error> {
        if let Some(old) = self.connection.take() {
            old.stop();
        }
        debug!(%url, "opening socket");
        self.connection = Some(WsConnection::open(url));
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        let sent = self.connection.as_ref().is_some_and(|conn| conn.send(text).is_ok());
        if !sent {
            // Reported through the session so it can reconnect
            warn!("socket gone before send");
            self.connection = None;
            self.pending.push_back(TransportEvent::Failed("connection closed".into()));
        }
        Ok(())
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        self.connection.as_mut().and_then(WsConnection::try_recv)
    }

    fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            self.closing = Some(conn);
        }
    }

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        app.highlight(&mut self.document);
        self.terminal.draw(|frame| {
            ui::render(frame, app, &self.input_state, &self.document);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        for conn in [self.connection.take(), self.closing.take()].into_iter().flatten() {
            conn.stop();
        }
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
