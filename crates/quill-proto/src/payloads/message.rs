//! Chat transcript messages and stream status values.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::content::ContentItem;

/// Author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Local user.
    User,
    /// Model reply.
    Ai,
}

/// A committed transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote it.
    pub role: Role,
    /// Content items in order.
    pub content: Vec<ContentItem>,
}

impl ChatMessage {
    /// User message holding a single text item.
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: vec![ContentItem::text(text)] }
    }

    /// Model reply built from assembled content.
    pub fn ai(content: Vec<ContentItem>) -> Self {
        Self { role: Role::Ai, content }
    }

    /// Concatenated text of all text items. Elements are skipped.
    pub fn text(&self) -> String {
        self.content.iter().filter_map(ContentItem::as_text).collect()
    }
}

/// Stream lifecycle status announced by the backend.
///
/// `thinking` arms a reply, `complete` commits it, `error` abandons it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    /// Backend accepted the request and is generating.
    Thinking,
    /// Reply finished.
    Complete,
    /// Reply failed.
    Error,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thinking => f.write_str("thinking"),
            Self::Complete => f.write_str("complete"),
            Self::Error => f.write_str("error"),
        }
    }
}
