//! Committed chat transcript.

use quill_proto::{ChatMessage, ContentItem};
use serde::{Deserialize, Serialize};

/// Ordered list of committed messages.
///
/// Append-only except for [`Transcript::clear`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user message.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    /// Append a model reply. Empty content is ignored; returns whether a
    /// message was added.
    pub fn commit(&mut self, content: Vec<ContentItem>) -> bool {
        if content.is_empty() {
            return false;
        }
        self.messages.push(ChatMessage::ai(content));
        true
    }

    /// Remove every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Messages in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use quill_proto::Role;

    use super::*;

    #[test]
    fn empty_reply_not_committed() {
        let mut transcript = Transcript::new();
        assert!(!transcript.commit(Vec::new()));
        assert!(transcript.is_empty());
    }

    #[test]
    fn messages_keep_order() {
        let mut transcript = Transcript::new();
        transcript.push_user("question");
        transcript.commit(vec![ContentItem::text("answer")]);

        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Ai]);
        assert_eq!(transcript.messages()[1].text(), "answer");
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut transcript = Transcript::new();
        transcript.push_user("hi");
        let value = serde_json::to_value(&transcript).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["role"], "user");
    }
}
