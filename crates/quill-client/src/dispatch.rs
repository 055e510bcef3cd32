//! Subscriber registry for inbound frames.
//!
//! Three independent subscriber lists:
//!
//! - message subscribers see every decoded frame as raw JSON
//! - status subscribers see the status value of `status` frames
//! - chunk subscribers see the content item of chunk frames
//!
//! A frame goes to all message subscribers first, then to the typed list
//! its `type` selects. Frames whose typed field did not parse reach message
//! subscribers only.
//!
//! # Invariants
//!
//! - Subscribers are invoked in registration order.
//! - A failing subscriber never prevents the remaining subscribers from
//!   running.
//! - After [`Dispatcher::unsubscribe`] returns, the handler is never invoked
//!   again.

use std::{collections::BTreeMap, fmt};

use quill_proto::{ContentItem, FrameKind, InboundFrame, StreamStatus};
use serde_json::Value;
use thiserror::Error;
use tracing::{trace, warn};

/// Error returned by a subscriber that could not handle a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

/// Handle returned by the `subscribe_*` methods.
///
/// Ids are unique across all three lists for the dispatcher's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// How many subscribers a frame reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Message subscribers invoked.
    pub messages: usize,
    /// Status subscribers invoked.
    pub statuses: usize,
    /// Chunk subscribers invoked.
    pub chunks: usize,
    /// Invocations that returned an error.
    pub failed: usize,
}

type Handler<T> = Box<dyn FnMut(&T) -> Result<(), SubscriberError> + Send>;

/// Registry of frame subscribers.
#[derive(Default)]
pub struct Dispatcher {
    next_id: u64,
    messages: BTreeMap<SubscriberId, Handler<Value>>,
    statuses: BTreeMap<SubscriberId, Handler<StreamStatus>>,
    chunks: BTreeMap<SubscriberId, Handler<ContentItem>>,
}

impl Dispatcher {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every decoded frame.
    pub fn subscribe_messages<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&Value) -> Result<(), SubscriberError> + Send + 'static,
    {
        let id = self.allocate();
        self.messages.insert(id, Box::new(handler));
        id
    }

    /// Subscribe to stream status transitions.
    pub fn subscribe_status<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&StreamStatus) -> Result<(), SubscriberError> + Send + 'static,
    {
        let id = self.allocate();
        self.statuses.insert(id, Box::new(handler));
        id
    }

    /// Subscribe to content chunks.
    pub fn subscribe_chunks<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&ContentItem) -> Result<(), SubscriberError> + Send + 'static,
    {
        let id = self.allocate();
        self.chunks.insert(id, Box::new(handler));
        id
    }

    /// Remove a subscriber. Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.messages.remove(&id).is_some()
            || self.statuses.remove(&id).is_some()
            || self.chunks.remove(&id).is_some()
    }

    /// Total registered subscribers.
    pub fn len(&self) -> usize {
        self.messages.len() + self.statuses.len() + self.chunks.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver a decoded frame.
    pub fn publish(&mut self, frame: &InboundFrame) -> DispatchReport {
        let mut report = DispatchReport::default();

        report.messages = invoke_all(&mut self.messages, frame.raw(), &mut report.failed);

        match frame.kind() {
            FrameKind::Status(status) => {
                report.statuses = invoke_all(&mut self.statuses, status, &mut report.failed);
            },
            FrameKind::Chunk(item) => {
                report.chunks = invoke_all(&mut self.chunks, item, &mut report.failed);
            },
            FrameKind::Invalid { tag, reason } => {
                warn!(%tag, %reason, "frame payload rejected, general subscribers only");
            },
            FrameKind::Other { tag } => {
                trace!(?tag, "untyped frame");
            },
        }

        report
    }

    fn allocate(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        id
    }
}

fn invoke_all<T>(
    handlers: &mut BTreeMap<SubscriberId, Handler<T>>,
    value: &T,
    failed: &mut usize,
) -> usize {
    for (id, handler) in handlers.iter_mut() {
        if let Err(e) = handler(value) {
            warn!(subscriber = ?id, error = %e, "subscriber failed");
            *failed += 1;
        }
    }
    handlers.len()
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("messages", &self.messages.len())
            .field("statuses", &self.statuses.len())
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}
