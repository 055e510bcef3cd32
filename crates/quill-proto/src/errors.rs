//! Protocol error types.

use thiserror::Error;

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire payloads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Inbound text was not a JSON object.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Outbound payload could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Model tag is not one the server understands.
    #[error("unknown model id: {0}")]
    UnknownModel(String),
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_map_to_serialization() {
        let err = serde_json::from_str::<u8>("nope").unwrap_err();
        assert!(matches!(ProtocolError::from(err), ProtocolError::Serialization(_)));
    }

    #[test]
    fn display_includes_detail() {
        let err = ProtocolError::UnknownModel("gpt2".into());
        assert_eq!(err.to_string(), "unknown model id: gpt2");
    }
}
