//! Outbound chat request.

use serde::{Deserialize, Serialize};

use super::message::Role;
use crate::{errors::Result, model::ModelId};

/// Event name carried in every outbound request.
pub const CHAT_MESSAGE_EVENT: &str = "chat_message";

/// Request sent when the user submits a message.
///
/// Serializes to the fixed shape the backend expects:
///
/// ```json
/// {
///   "name": "chat_message",
///   "message": {"content": "...", "role": "user"},
///   "model": "claude3.7",
///   "mode": "chat",
///   "block_ids": "...",
///   "document_id": "...",
///   "chat_id": "...",
///   "user_id": "..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Event name, always [`CHAT_MESSAGE_EVENT`].
    pub name: String,
    /// The user message.
    pub message: RequestMessage,
    /// Target model.
    pub model: ModelId,
    /// Interaction mode.
    pub mode: ChatMode,
    /// Correlation identifiers, flattened into the top-level object.
    #[serde(flatten)]
    pub correlation: Correlation,
}

impl ChatRequest {
    /// Build a request for `content`.
    pub fn new(
        content: impl Into<String>,
        model: ModelId,
        mode: ChatMode,
        correlation: Correlation,
    ) -> Self {
        Self {
            name: CHAT_MESSAGE_EVENT.to_owned(),
            message: RequestMessage { content: content.into(), role: Role::User },
            model,
            mode,
            correlation,
        }
    }

    /// Encode as a JSON text frame.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Message body of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMessage {
    /// Composed message text.
    pub content: String,
    /// Always [`Role::User`] for outbound requests.
    pub role: Role,
}

/// How the backend should treat the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// Plain chat reply.
    #[default]
    Chat,
    /// Agent mode, allowed to use tools.
    Agent,
}

/// Identifiers the backend uses to correlate a request with a document,
/// chat and user.
///
/// The backend does not validate these yet; [`Correlation::default`] yields
/// the placeholder values it has always been sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    /// Selected block identifiers.
    pub block_ids: String,
    /// Document identifier.
    pub document_id: String,
    /// Chat identifier.
    pub chat_id: String,
    /// User identifier.
    pub user_id: String,
}

impl Default for Correlation {
    fn default() -> Self {
        Self {
            block_ids: "234234234AWEFAWEF".to_owned(),
            document_id: "AWEFAWE3453453453".to_owned(),
            chat_id: "34234DFAWFA".to_owned(),
            user_id: "23423423AWEFAWEFAWEF".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_has_fixed_shape() {
        let request =
            ChatRequest::new("hello", ModelId::Claude37, ChatMode::Chat, Correlation::default());
        let value: serde_json::Value = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "chat_message",
                "message": {"content": "hello", "role": "user"},
                "model": "claude3.7",
                "mode": "chat",
                "block_ids": "234234234AWEFAWEF",
                "document_id": "AWEFAWE3453453453",
                "chat_id": "34234DFAWFA",
                "user_id": "23423423AWEFAWEFAWEF"
            })
        );
    }

    #[test]
    fn agent_mode_serializes_lowercase() {
        let request =
            ChatRequest::new("x", ModelId::Gpt4, ChatMode::Agent, Correlation::default());
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["mode"], "agent");
        assert_eq!(value["model"], "gpt4");
    }

    #[test]
    fn request_parses_back() {
        let request =
            ChatRequest::new("x", ModelId::KimiK2, ChatMode::Chat, Correlation::default());
        let parsed: ChatRequest = serde_json::from_str(&request.to_json().unwrap()).unwrap();
        assert_eq!(parsed, request);
    }
}
