//! Inbound socket frames.
//!
//! Every inbound frame is a JSON object. Its `type` field decides routing:
//!
//! - `"status"`: a [`StreamStatus`] in the `status` field
//! - `"chunk"` or `"md"`: a [`ContentItem`] in the `content` field
//! - anything else: delivered to general subscribers only
//!
//! Decoding is two-staged. Text that is not a JSON object fails outright
//! with [`ProtocolError::Malformed`]. A well-formed object whose typed field
//! does not parse still decodes, as [`FrameKind::Invalid`], so general
//! subscribers can observe it while typed subscribers are skipped.

use serde_json::{Map, Value, json};

use crate::{
    errors::{ProtocolError, Result},
    payloads::{ContentItem, StreamStatus},
};

/// `type` tag of status frames.
pub const STATUS_TAG: &str = "status";

/// `type` tag of content chunk frames.
pub const CHUNK_TAG: &str = "chunk";

/// Legacy `type` tag for chunk frames carrying markdown text.
pub const MARKDOWN_CHUNK_TAG: &str = "md";

/// Routing classification of an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Stream status transition.
    Status(StreamStatus),
    /// Content chunk for the reply being streamed.
    Chunk(ContentItem),
    /// Frame with an unrecognized (or missing) `type`.
    Other {
        /// The `type` value, if it was a string.
        tag: Option<String>,
    },
    /// Frame with a recognized `type` whose payload did not parse.
    Invalid {
        /// The `type` value.
        tag: String,
        /// Why the payload was rejected.
        reason: String,
    },
}

/// A decoded inbound frame.
///
/// Keeps the raw JSON object for general subscribers alongside the typed
/// classification.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundFrame {
    raw: Value,
    kind: FrameKind,
}

impl InboundFrame {
    /// Decode a text frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Malformed` if `text` is not a JSON object
    pub fn decode(text: &str) -> Result<Self> {
        let raw: Value =
            serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        Self::from_value(raw)
    }

    /// Classify an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Malformed` if `raw` is not a JSON object
    pub fn from_value(raw: Value) -> Result<Self> {
        let Some(object) = raw.as_object() else {
            return Err(ProtocolError::Malformed("frame is not a JSON object".into()));
        };

        let kind = match object.get("type").and_then(Value::as_str) {
            Some(STATUS_TAG) => classify_status(object),
            Some(tag @ (CHUNK_TAG | MARKDOWN_CHUNK_TAG)) => classify_chunk(tag, object),
            other => FrameKind::Other { tag: other.map(str::to_owned) },
        };

        Ok(Self { raw, kind })
    }

    /// Routing classification.
    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }

    /// The parsed JSON object.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume the frame, returning the parsed JSON object.
    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// The `type` field, if present and a string.
    pub fn tag(&self) -> Option<&str> {
        self.raw.get("type").and_then(Value::as_str)
    }

    /// Encode a status frame as the server would send it.
    pub fn encode_status(status: StreamStatus) -> String {
        json!({"type": STATUS_TAG, "status": status}).to_string()
    }

    /// Encode a chunk frame as the server would send it.
    pub fn encode_chunk(item: &ContentItem) -> String {
        json!({"type": CHUNK_TAG, "content": item}).to_string()
    }
}

fn classify_status(object: &Map<String, Value>) -> FrameKind {
    let Some(status) = object.get("status") else {
        return invalid(STATUS_TAG, "missing `status` field");
    };

    match serde_json::from_value::<StreamStatus>(status.clone()) {
        Ok(status) => FrameKind::Status(status),
        Err(e) => invalid(STATUS_TAG, e.to_string()),
    }
}

fn classify_chunk(tag: &str, object: &Map<String, Value>) -> FrameKind {
    match object.get("content") {
        None => invalid(tag, "missing `content` field"),
        // Markdown chunks may carry bare text instead of a content item.
        Some(Value::String(text)) => FrameKind::Chunk(ContentItem::text(text.clone())),
        Some(content) => match serde_json::from_value::<ContentItem>(content.clone()) {
            Ok(item) => FrameKind::Chunk(item),
            Err(e) => invalid(tag, e.to_string()),
        },
    }
}

fn invalid(tag: &str, reason: impl Into<String>) -> FrameKind {
    FrameKind::Invalid { tag: tag.to_owned(), reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_frame() {
        let frame = InboundFrame::decode(r#"{"type":"status","status":"thinking"}"#).unwrap();
        assert_eq!(frame.kind(), &FrameKind::Status(StreamStatus::Thinking));
        assert_eq!(frame.tag(), Some("status"));
    }

    #[test]
    fn chunk_frame() {
        let frame =
            InboundFrame::decode(r#"{"type":"chunk","content":{"type":"text","text":"Hel"}}"#)
                .unwrap();
        assert_eq!(frame.kind(), &FrameKind::Chunk(ContentItem::text("Hel")));
    }

    #[test]
    fn markdown_chunk_with_bare_text() {
        let frame = InboundFrame::decode(r##"{"type":"md","content":"# Title"}"##).unwrap();
        assert_eq!(frame.kind(), &FrameKind::Chunk(ContentItem::text("# Title")));
    }

    #[test]
    fn unknown_status_is_invalid() {
        let frame = InboundFrame::decode(r#"{"type":"status","status":"paused"}"#).unwrap();
        assert!(matches!(frame.kind(), FrameKind::Invalid { tag, .. } if tag == "status"));
    }

    #[test]
    fn missing_content_is_invalid() {
        let frame = InboundFrame::decode(r#"{"type":"chunk"}"#).unwrap();
        assert_eq!(
            frame.kind(),
            &FrameKind::Invalid { tag: "chunk".into(), reason: "missing `content` field".into() }
        );
    }

    #[test]
    fn untyped_object_is_other() {
        let frame = InboundFrame::decode(r#"{"hello":"world"}"#).unwrap();
        assert_eq!(frame.kind(), &FrameKind::Other { tag: None });

        let frame = InboundFrame::decode(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(frame.kind(), &FrameKind::Other { tag: Some("ping".into()) });
    }

    #[test]
    fn non_object_rejected() {
        assert!(matches!(InboundFrame::decode("[1,2]"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(InboundFrame::decode("not json"), Err(ProtocolError::Malformed(_))));
    }

    #[test]
    fn encoded_frames_decode() {
        let text = InboundFrame::encode_status(StreamStatus::Complete);
        let frame = InboundFrame::decode(&text).unwrap();
        assert_eq!(frame.kind(), &FrameKind::Status(StreamStatus::Complete));

        let text = InboundFrame::encode_chunk(&ContentItem::text("x"));
        let frame = InboundFrame::decode(&text).unwrap();
        assert_eq!(frame.kind(), &FrameKind::Chunk(ContentItem::text("x")));
    }
}
