//! Protocol-to-Application translation layer.
//!
//! The [`Bridge`] wraps the [`quill_client::SocketClient`] and adapts it to
//! the high-level application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts high-level [`crate::AppAction`] into client events.
//! - Accumulates outgoing [`TransportCommand`]s to be executed by the driver
//!   in the next I/O cycle.
//! - Subscribes to status and chunk frames on the client's dispatcher and
//!   forwards them as [`crate::AppEvent`]s.
//! - Manages time ticks generically to support both real-time execution and
//!   deterministic simulation.

use quill_client::{
    ClientAction, ClientError, ClientEvent, Environment, SessionConfig, SocketClient,
    SubscriberError, TransportEvent,
};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::{AppAction, AppEvent, ConnectionState};

/// Socket operation for the driver to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCommand {
    /// Open a connection.
    Open {
        /// Endpoint.
        url: String,
    },
    /// Write one text frame.
    Send(String),
    /// Close the connection.
    Close,
}

/// Bridge between App and client protocol logic.
///
/// Generic over Environment to support both production and simulation.
/// The Instant type is determined by the Environment's associated type.
pub struct Bridge<E: Environment> {
    client: SocketClient<E>,
    outgoing: Vec<TransportCommand>,
    inbox: mpsc::UnboundedReceiver<AppEvent>,
}

impl<E: Environment> Bridge<E> {
    /// Create a Bridge and register the app's status and chunk subscribers.
    pub fn new(env: E, config: SessionConfig) -> Self {
        let mut client = SocketClient::new(env, config);
        let (tx, inbox) = mpsc::unbounded_channel();

        let status_tx = tx.clone();
        client.dispatcher_mut().subscribe_status(move |status| {
            status_tx
                .send(AppEvent::Status(*status))
                .map_err(|e| SubscriberError(e.to_string()))
        });
        client.dispatcher_mut().subscribe_chunks(move |item| {
            tx.send(AppEvent::Chunk(item.clone())).map_err(|e| SubscriberError(e.to_string()))
        });

        Self { client, outgoing: Vec::new(), inbox }
    }

    /// The wrapped client.
    pub fn client(&self) -> &SocketClient<E> {
        &self.client
    }

    /// The wrapped client, for registering further subscribers.
    pub fn client_mut(&mut self) -> &mut SocketClient<E> {
        &mut self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        let event = match action {
            AppAction::Connect => ClientEvent::Connect,
            AppAction::Retry => ClientEvent::Retry,
            AppAction::Disconnect => ClientEvent::Disconnect,
            AppAction::SendChat { content, model, is_agent } => {
                ClientEvent::Send { content, model, is_agent }
            },
            AppAction::Render | AppAction::Quit | AppAction::Persist(_) => return vec![],
        };

        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Handle an event reported by the transport.
    pub fn handle_transport(&mut self, event: TransportEvent) -> Vec<AppEvent> {
        let event = match event {
            TransportEvent::Opened => ClientEvent::Opened,
            TransportEvent::Text(text) => ClientEvent::TextReceived(text),
            TransportEvent::Closed(info) => ClientEvent::Closed(info),
            TransportEvent::Failed(message) => ClientEvent::Failed { message },
        };

        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: E::Instant) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Cancel any pending reconnect and close the socket for good.
    pub fn shutdown(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Shutdown);
        self.handle_client_result(result)
    }

    /// Take pending transport commands.
    pub fn take_outgoing(&mut self) -> Vec<TransportCommand> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Open { url } => self.outgoing.push(TransportCommand::Open { url }),
                ClientAction::SendText(text) => self.outgoing.push(TransportCommand::Send(text)),
                ClientAction::Close => self.outgoing.push(TransportCommand::Close),
                ClientAction::ScheduleReconnect { delay, attempt } => {
                    debug!(?delay, attempt, "reconnect scheduled");
                },
                ClientAction::CancelReconnect => trace!("reconnect cancelled"),
                ClientAction::SendDeferred { reason } => {
                    events.push(AppEvent::SendDeferred { reason });
                },
                ClientAction::Delivered(report) => {
                    trace!(?report, "frame delivered");
                    while let Ok(event) = self.inbox.try_recv() {
                        events.push(event);
                    }
                },
                ClientAction::StatusChanged(snapshot) => {
                    events.push(AppEvent::ConnectionChanged(ConnectionState::from(&snapshot)));
                },
            }
        }

        events
    }
}

impl<E: Environment> std::fmt::Debug for Bridge<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("client", &self.client)
            .field("outgoing", &self.outgoing.len())
            .finish_non_exhaustive()
    }
}
