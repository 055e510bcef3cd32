//! WebSocket transport for the client.
//!
//! Provides [`WsConnection`], which owns one socket in a background task.
//! This is a thin layer that moves text frames and lifecycle reports across
//! channels. Reconnection and routing stay in the Sans-IO
//! [`crate::SocketClient`].
//!
//! Each connection reports exactly one terminal event: `Failed` if the open
//! handshake or the socket errors, `Closed` otherwise.

use futures::{SinkExt, StreamExt};
use quill_core::CloseInfo;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Message, protocol::CloseFrame},
};
use tracing::{debug, warn};

use crate::event::TransportEvent;

/// Transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection task has exited.
    #[error("connection closed")]
    Closed,
}

enum Outbound {
    Text(String),
    Close,
}

/// Handle to a WebSocket connection task.
///
/// Dropping the handle aborts the task without a close handshake. Use
/// [`WsConnection::close`] for a graceful close.
pub struct WsConnection {
    outbound: mpsc::UnboundedSender<Outbound>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    abort_handle: tokio::task::AbortHandle,
}

impl WsConnection {
    /// Start connecting to `url`.
    ///
    /// Returns immediately. The outcome arrives as [`TransportEvent::Opened`]
    /// or [`TransportEvent::Failed`]. Must be called inside a Tokio runtime.
    pub fn open(url: impl Into<String>) -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run_connection(url.into(), outbound_rx, events_tx));

        Self { outbound: outbound_tx, events: events_rx, abort_handle: handle.abort_handle() }
    }

    /// Queue a text frame.
    pub fn send(&self, text: String) -> Result<(), TransportError> {
        self.outbound.send(Outbound::Text(text)).map_err(|_| TransportError::Closed)
    }

    /// Send a close frame and end the task.
    pub fn close(&self) {
        let _ = self.outbound.send(Outbound::Close);
    }

    /// Next transport event. `None` once the task has exited and every
    /// event was consumed.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Next transport event, if one is ready.
    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.events.try_recv().ok()
    }

    /// Abort the connection task.
    pub fn stop(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.abort_handle.abort();
    }
}

/// Run the connection, bridging between channels and the socket.
async fn run_connection(
    url: String,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            warn!(%url, error = %e, "websocket connect failed");
            let _ = events.send(TransportEvent::Failed(e.to_string()));
            return;
        },
    };

    debug!(%url, "websocket open");
    if events.send(TransportEvent::Opened).is_err() {
        return;
    }

    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if events.send(TransportEvent::Text(text)).is_err() {
                        break;
                    }
                },
                Some(Ok(Message::Close(frame))) => {
                    let _ = events.send(TransportEvent::Closed(close_info(frame)));
                    break;
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    let _ = events.send(TransportEvent::Failed(e.to_string()));
                    break;
                },
                None => {
                    let _ = events.send(TransportEvent::Closed(CloseInfo::default()));
                    break;
                },
            },
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        let _ = events.send(TransportEvent::Failed(e.to_string()));
                        break;
                    }
                },
                Some(Outbound::Close) | None => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                },
            },
        }
    }
}

fn close_info(frame: Option<CloseFrame<'static>>) -> CloseInfo {
    match frame {
        Some(frame) => CloseInfo { code: Some(u16::from(frame.code)), reason: frame.reason.into_owned() },
        None => CloseInfo::default(),
    }
}
