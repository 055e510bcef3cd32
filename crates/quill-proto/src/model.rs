//! Model identifiers accepted by the chat backend.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// Language model the backend should route a request to.
///
/// Serialized as the backend's string tag (e.g. `"claude3.7"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ModelId {
    /// Gemini Flash 2.
    #[serde(rename = "gemini-flash2")]
    GeminiFlash2,
    /// Claude 3.7 Sonnet. Default for new sessions.
    #[default]
    #[serde(rename = "claude3.7")]
    Claude37,
    /// Claude 3.7 Sonnet with extended reasoning.
    #[serde(rename = "claude3.7-reasoning")]
    Claude37Reasoning,
    /// GPT-4.
    #[serde(rename = "gpt4")]
    Gpt4,
    /// o3-mini.
    #[serde(rename = "o3mini")]
    O3Mini,
    /// DeepSeek.
    #[serde(rename = "deepseek")]
    DeepSeek,
    /// Claude Sonnet 4.
    #[serde(rename = "claude-sonnet-4")]
    ClaudeSonnet4,
    /// Kimi K2.
    #[serde(rename = "kimi-k2")]
    KimiK2,
}

impl ModelId {
    /// Every model, in picker order.
    pub const ALL: [Self; 8] = [
        Self::Claude37,
        Self::Claude37Reasoning,
        Self::ClaudeSonnet4,
        Self::GeminiFlash2,
        Self::Gpt4,
        Self::O3Mini,
        Self::DeepSeek,
        Self::KimiK2,
    ];

    /// Wire tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::GeminiFlash2 => "gemini-flash2",
            Self::Claude37 => "claude3.7",
            Self::Claude37Reasoning => "claude3.7-reasoning",
            Self::Gpt4 => "gpt4",
            Self::O3Mini => "o3mini",
            Self::DeepSeek => "deepseek",
            Self::ClaudeSonnet4 => "claude-sonnet-4",
            Self::KimiK2 => "kimi-k2",
        }
    }

    /// Human-readable name for pickers and status lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::GeminiFlash2 => "Gemini Flash 2",
            Self::Claude37 => "Claude 3.7 Sonnet",
            Self::Claude37Reasoning => "Claude 3.7 Reasoning",
            Self::Gpt4 => "GPT-4",
            Self::O3Mini => "o3-mini",
            Self::DeepSeek => "DeepSeek",
            Self::ClaudeSonnet4 => "Claude Sonnet 4",
            Self::KimiK2 => "Kimi K2",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ModelId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|model| model.tag() == s)
            .ok_or_else(|| ProtocolError::UnknownModel(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_back() {
        for model in ModelId::ALL {
            assert_eq!(model.tag().parse::<ModelId>().unwrap(), model);
        }
    }

    #[test]
    fn serde_uses_wire_tag() {
        for model in ModelId::ALL {
            let json = serde_json::to_string(&model).unwrap();
            assert_eq!(json, format!("\"{}\"", model.tag()));
        }
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = "gpt2".parse::<ModelId>().unwrap_err();
        assert_eq!(err, ProtocolError::UnknownModel("gpt2".into()));
    }

    #[test]
    fn default_is_claude() {
        assert_eq!(ModelId::default(), ModelId::Claude37);
    }
}
