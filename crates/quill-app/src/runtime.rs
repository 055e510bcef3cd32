//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Protocol bridge to the socket client
//! - [`Driver`]: Platform-specific I/O
//! - [`StateStore`]: Persisted preferences

use quill_client::{Environment, SessionConfig};
use tracing::{info, warn};

use crate::{
    App, AppAction, AppEvent, Bridge, Driver, PersistPolicy, PersistedState, TransportCommand,
    persist::{load_state, save_state},
    storage::StateStore,
};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for time and randomness
/// - `S`: Storage for persisted state
pub struct Runtime<D, E, S>
where
    D: Driver,
    E: Environment,
    S: StateStore,
{
    driver: D,
    app: App,
    bridge: Bridge<E>,
    store: S,
}

impl<D, E, S> Runtime<D, E, S>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
    S: StateStore,
{
    /// Create a runtime, restoring persisted state from `store`.
    ///
    /// Unreadable state is logged and replaced by defaults.
    pub fn new(driver: D, env: E, config: SessionConfig, store: S, policy: PersistPolicy) -> Self {
        let mut app = App::new(config.url.clone(), policy);
        match load_state(&store) {
            Ok(Some(state)) => {
                info!(model = %state.selected_model, is_agent = state.is_agent, "restored state");
                app.restore(state);
            },
            Ok(None) => {},
            Err(e) => {
                warn!(error = %e, "discarding unreadable state");
                app.set_status("Saved preferences could not be read, using defaults");
            },
        }

        let bridge = Bridge::new(env, config);
        Self { driver, app, bridge, store }
    }

    /// Run the main event loop until the app quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an unrecoverable I/O error.
    /// The socket is shut down either way.
    pub async fn run(mut self) -> Result<(), D::Error> {
        let result = self.drive().await;
        self.shutdown().await;
        result
    }

    async fn drive(&mut self) -> Result<(), D::Error> {
        if self.start().await? {
            return Ok(());
        }
        while !self.step().await? {}
        Ok(())
    }

    /// Render once and start connecting.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub async fn start(&mut self) -> Result<bool, D::Error> {
        self.driver.render(&self.app)?;
        let actions = self.app.connect();
        self.process_actions(actions).await
    }

    /// Process one cycle of the event loop.
    ///
    /// 1. Polls for user input
    /// 2. Drains ready transport events
    /// 3. Ticks the session so a due reconnect fires
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let actions = self.driver.poll_input(&mut self.app).await?;
        if !actions.is_empty() && self.process_actions(actions).await? {
            return Ok(true);
        }

        while let Some(event) = self.driver.recv_transport().await {
            let events = self.bridge.handle_transport(event);
            self.flush_outgoing().await?;
            if self.process_bridge_events(events).await? {
                return Ok(true);
            }
        }

        let now = self.driver.now();
        let events = self.bridge.handle_tick(now);
        self.flush_outgoing().await?;
        self.process_bridge_events(events).await
    }

    /// Cancel any pending reconnect, close the socket and stop the driver.
    pub async fn shutdown(&mut self) {
        let events = self.bridge.shutdown();
        if let Err(e) = self.flush_outgoing().await {
            warn!(error = %e, "failed to close socket during shutdown");
        }
        for event in events {
            self.app.handle(event);
        }
        self.driver.stop();
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::Persist(state) => self.persist(&state),

                    // Socket operations go through the bridge
                    AppAction::Connect
                    | AppAction::Retry
                    | AppAction::Disconnect
                    | AppAction::SendChat { .. } => {
                        let events = self.bridge.process_app_action(action);
                        self.flush_outgoing().await?;
                        for event in events {
                            pending_actions.extend(self.app.handle(event));
                        }
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Execute pending transport commands.
    async fn flush_outgoing(&mut self) -> Result<(), D::Error> {
        for command in self.bridge.take_outgoing() {
            match command {
                TransportCommand::Open { url } => self.driver.open(&url).await?,
                TransportCommand::Send(text) => self.driver.send_text(text).await?,
                TransportCommand::Close => self.driver.close(),
            }
        }
        Ok(())
    }

    fn persist(&mut self, state: &PersistedState) {
        if let Err(e) = save_state(&self.store, state) {
            warn!(error = %e, "failed to persist state");
            self.app.set_status(format!("Could not save preferences: {e}"));
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<E> {
        &self.bridge
    }

    /// Get a mutable reference to the Bridge
    pub fn bridge_mut(&mut self) -> &mut Bridge<E> {
        &mut self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the Driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Get a reference to the store
    pub fn store(&self) -> &S {
        &self.store
    }
}
