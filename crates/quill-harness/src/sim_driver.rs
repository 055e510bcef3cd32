//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`quill_app::Runtime`] orchestration code runs in both production and
//! simulation.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use quill_app::{App, AppAction, AppEvent, Driver};
use quill_client::TransportEvent;
use quill_core::Environment;

use crate::{
    invariants::{InvariantRegistry, SystemSnapshot},
    sim_env::{SimEnv, SimInstant},
};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

type Input = Box<dyn FnOnce(&mut App) -> Vec<AppAction> + Send>;

/// Shared state for event injection.
///
/// This allows injection from outside async contexts.
#[derive(Default)]
struct SharedState {
    pending_input: VecDeque<Input>,
    incoming: VecDeque<TransportEvent>,
    sent: Vec<String>,
    opened: Vec<String>,
    closes: usize,
    renders: usize,
    transcript_history: Vec<usize>,
    socket_open: bool,
    auto_open: bool,
    fail_render: bool,
}

/// Simulation driver for deterministic testing.
///
/// Clones share state, so a test can keep a handle for injection and
/// inspection after moving the driver into a [`quill_app::Runtime`].
#[derive(Clone)]
pub struct SimDriver {
    env: SimEnv,
    state: Arc<Mutex<SharedState>>,
    invariants: Option<Arc<InvariantRegistry>>,
}

impl SimDriver {
    /// Create a driver reading time from `env`.
    pub fn new(env: SimEnv) -> Self {
        Self { env, state: Arc::new(Mutex::new(SharedState::default())), invariants: None }
    }

    /// Answer every open with [`TransportEvent::Opened`].
    #[must_use]
    pub fn with_auto_open(self) -> Self {
        self.lock().auto_open = true;
        self
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(Arc::new(registry));
        self
    }

    /// Queue user input. `input` runs against the app on the next poll.
    pub fn inject_input<F>(&self, input: F)
    where
        F: FnOnce(&mut App) -> Vec<AppAction> + Send + 'static,
    {
        self.lock().pending_input.push_back(Box::new(input));
    }

    /// Queue an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.inject_input(move |app| app.handle(event));
    }

    /// Queue typing `text` and pressing enter.
    pub fn inject_submit(&self, text: impl Into<String>) {
        let text = text.into();
        self.inject_input(move |app| {
            app.set_draft(text);
            app.submit()
        });
    }

    /// Queue a transport event.
    pub fn inject_transport(&self, event: TransportEvent) {
        self.lock().incoming.push_back(event);
    }

    /// Queue an inbound text frame.
    pub fn inject_frame(&self, text: impl Into<String>) {
        self.inject_transport(TransportEvent::Text(text.into()));
    }

    /// Take all texts written to the socket.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Urls passed to `open`, oldest first.
    pub fn opened(&self) -> Vec<String> {
        self.lock().opened.clone()
    }

    /// Number of `close` calls.
    pub fn closes(&self) -> usize {
        self.lock().closes
    }

    /// Number of renders.
    pub fn renders(&self) -> usize {
        self.lock().renders
    }

    /// Make the next render fail.
    pub fn fail_next_render(&self) {
        self.lock().fail_render = true;
    }

    /// Check if there is pending input or transport traffic.
    pub fn has_pending(&self) -> bool {
        let state = self.lock();
        !state.pending_input.is_empty() || !state.incoming.is_empty()
    }

    /// Snapshot from App state, including transcript history seen so far.
    pub fn snapshot_from_app(&self, app: &App) -> SystemSnapshot {
        let history = self.lock().transcript_history.clone();
        SystemSnapshot::from_app(app).with_transcript_history(history)
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = SimInstant;

    async fn poll_input(&mut self, app: &mut App) -> Result<Vec<AppAction>, Self::Error> {
        let input = self.lock().pending_input.pop_front();
        Ok(input.map(|input| input(app)).unwrap_or_default())
    }

    async fn open(&mut self, url: &str) -> Result<(), Self::Error> {
        tracing::debug!(url, "sim open");
        let mut state = self.lock();
        state.opened.push(url.to_owned());
        if state.auto_open {
            state.incoming.push_back(TransportEvent::Opened);
        }
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        let mut state = self.lock();
        if !state.socket_open {
            tracing::warn!(len = text.len(), "sim send on closed socket");
            return Err(SimDriverError("send on closed socket".into()));
        }
        state.sent.push(text);
        Ok(())
    }

    async fn recv_transport(&mut self) -> Option<TransportEvent> {
        let mut state = self.lock();
        let event = state.incoming.pop_front()?;
        match &event {
            TransportEvent::Opened => state.socket_open = true,
            TransportEvent::Closed(_) | TransportEvent::Failed(_) => state.socket_open = false,
            TransportEvent::Text(_) => {},
        }
        Some(event)
    }

    fn close(&mut self) {
        let mut state = self.lock();
        state.socket_open = false;
        state.closes += 1;
    }

    fn now(&self) -> SimInstant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let history = {
            let mut state = self.lock();
            if std::mem::take(&mut state.fail_render) {
                tracing::error!(renders = state.renders, "injected render failure");
                return Err(SimDriverError("render failed".into()));
            }
            state.renders += 1;
            state.transcript_history.push(app.transcript().len());
            state.transcript_history.clone()
        };

        if let Some(registry) = &self.invariants {
            let snapshot = SystemSnapshot::from_app(app).with_transcript_history(history);
            registry.assert_all(&snapshot, &format!("after render {}", self.renders()));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.lock().socket_open = false;
    }
}
