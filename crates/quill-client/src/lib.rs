//! Client
//!
//! Action-based socket client for Quill. Wraps the [`quill_core::Session`]
//! lifecycle and fans decoded inbound frames out to registered subscribers.
//!
//! # Architecture
//!
//! The client follows the same Sans-IO and action-based patterns as
//! [`quill_core`]. It receives events ([`ClientEvent`]), processes them
//! through pure state machine logic, and returns actions ([`ClientAction`])
//! for the caller to execute.
//!
//! # Components
//!
//! - [`SocketClient`]: session lifecycle plus dispatch
//! - [`Dispatcher`]: registry of general, status and chunk subscribers
//! - [`ClientEvent`]: events fed into the client
//! - [`ClientAction`]: actions produced by the client
//!
//! # Transport (optional)
//!
//! With the `transport` feature enabled, this crate also provides
//! [`transport::WsConnection`], a WebSocket connection task that reports
//! [`TransportEvent`]s back to the caller.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod dispatch;
mod error;
mod event;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::SocketClient;
pub use dispatch::{DispatchReport, Dispatcher, SubscriberError, SubscriberId};
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, TransportEvent};
pub use quill_core::{CloseInfo, Environment, SessionConfig, SessionSnapshot};
