//! Wire types for the Quill chat socket protocol.
//!
//! The server speaks JSON text frames over a WebSocket. Outbound, the client
//! sends a single request shape ([`ChatRequest`]). Inbound, every frame is a
//! JSON object whose `type` field selects how it is routed: stream status
//! transitions, content chunks, or anything else (which only general
//! subscribers see).
//!
//! This crate is pure data. It performs no I/O and holds no connection state.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod errors;
mod frame;
mod model;
pub mod payloads;

pub use errors::{ProtocolError, Result};
pub use frame::{CHUNK_TAG, FrameKind, InboundFrame, MARKDOWN_CHUNK_TAG, STATUS_TAG};
pub use model::ModelId;
pub use payloads::{
    ChatMessage, ChatMode, ChatRequest, CodeBlock, ContentItem, Correlation, FileTree, Image,
    RequestMessage, Role, StreamStatus, UiElement, WebSearch,
};
