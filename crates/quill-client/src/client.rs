//! Socket client state machine.

use quill_core::{Environment, SendOutcome, Session, SessionAction, SessionConfig, SessionError};
use serde_json::Value;
use tracing::debug;

use crate::{
    dispatch::Dispatcher,
    error::ClientError,
    event::{ClientAction, ClientEvent},
};

/// Socket client: one [`Session`] plus a [`Dispatcher`].
///
/// Inbound text is decoded by the session and published to subscribers.
/// Every call to [`SocketClient::handle`] that changes the observable
/// connection status ends with a [`ClientAction::StatusChanged`].
pub struct SocketClient<E: Environment> {
    env: E,
    session: Session<E::Instant>,
    dispatcher: Dispatcher,
    last_message: Option<Value>,
}

impl<E: Environment> SocketClient<E> {
    /// Create an idle client.
    pub fn new(env: E, config: SessionConfig) -> Self {
        Self { env, session: Session::new(config), dispatcher: Dispatcher::new(), last_message: None }
    }

    /// The underlying session.
    pub fn session(&self) -> &Session<E::Instant> {
        &self.session
    }

    /// Subscriber registry.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    /// Most recent successfully decoded frame.
    pub fn last_message(&self) -> Option<&Value> {
        self.last_message.as_ref()
    }

    /// True while the socket is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Process an event and return resulting actions.
    pub fn handle(
        &mut self,
        event: ClientEvent<E::Instant>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let before = self.session.snapshot();

        let mut actions = match event {
            ClientEvent::Connect => self.lift(|s, now| s.connect(now)),
            ClientEvent::Retry => self.lift(|s, now| s.retry(now)),
            ClientEvent::Disconnect => self.lift(|s, _| s.disconnect()),
            ClientEvent::Shutdown => self.lift(|s, _| s.shutdown()),
            ClientEvent::Opened => self.lift(|s, now| s.on_open(now)),
            ClientEvent::Closed(info) => self.lift(|s, now| s.on_close(now, &info)),
            ClientEvent::Failed { message } => self.lift(|s, now| s.on_error(now, message)),
            ClientEvent::Tick { now } => convert(self.session.tick(now)),
            ClientEvent::TextReceived(text) => self.handle_text(&text),
            ClientEvent::Send { content, model, is_agent } => {
                let now = self.env.now();
                match self.session.send_message(now, &content, model, is_agent)? {
                    SendOutcome::Sent(actions) => convert(actions),
                    SendOutcome::Deferred(actions) => {
                        let mut actions = convert(actions);
                        actions.push(ClientAction::SendDeferred {
                            reason: SessionError::NotConnected.to_string(),
                        });
                        actions
                    },
                }
            },
        };

        let after = self.session.snapshot();
        if after != before {
            actions.push(ClientAction::StatusChanged(after));
        }

        Ok(actions)
    }

    fn lift(
        &mut self,
        op: impl FnOnce(&mut Session<E::Instant>, E::Instant) -> Vec<SessionAction>,
    ) -> Vec<ClientAction> {
        let now = self.env.now();
        convert(op(&mut self.session, now))
    }

    fn handle_text(&mut self, text: &str) -> Vec<ClientAction> {
        let Some(frame) = self.session.decode(text) else {
            return Vec::new();
        };

        let report = self.dispatcher.publish(&frame);
        debug!(tag = ?frame.tag(), ?report, "frame dispatched");
        self.last_message = Some(frame.into_raw());

        vec![ClientAction::Delivered(report)]
    }
}

fn convert(actions: Vec<SessionAction>) -> Vec<ClientAction> {
    actions
        .into_iter()
        .map(|action| match action {
            SessionAction::Open { url } => ClientAction::Open { url },
            SessionAction::Send(text) => ClientAction::SendText(text),
            SessionAction::Close => ClientAction::Close,
            SessionAction::ScheduleReconnect { delay, attempt } => {
                ClientAction::ScheduleReconnect { delay, attempt }
            },
            SessionAction::CancelReconnect => ClientAction::CancelReconnect,
        })
        .collect()
}

impl<E: Environment> std::fmt::Debug for SocketClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketClient")
            .field("phase", &self.session.phase())
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
