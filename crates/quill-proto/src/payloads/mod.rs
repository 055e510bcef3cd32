//! JSON payloads carried inside socket frames.
//!
//! Inbound content is a sequence of [`ContentItem`]s: plain text runs and
//! structured UI elements. Outbound traffic is a single [`ChatRequest`]
//! shape. Field names match the backend exactly, so renames here are wire
//! breaking.

pub mod content;
pub mod message;
pub mod request;

pub use content::{CodeBlock, ContentItem, FileTree, Image, UiElement, WebSearch};
pub use message::{ChatMessage, Role, StreamStatus};
pub use request::{CHAT_MESSAGE_EVENT, ChatMode, ChatRequest, Correlation, RequestMessage};
