//! Property-based tests for inbound frame decoding.
//!
//! Decoding runs on untrusted server text, so it must never panic and must
//! classify well-formed frames consistently regardless of their contents.

use proptest::prelude::*;
use quill_proto::{ContentItem, FrameKind, InboundFrame, StreamStatus};

fn arbitrary_status() -> impl Strategy<Value = StreamStatus> {
    prop_oneof![
        Just(StreamStatus::Thinking),
        Just(StreamStatus::Complete),
        Just(StreamStatus::Error),
    ]
}

proptest! {
    #[test]
    fn decode_never_panics(text in ".{0,256}") {
        let _ = InboundFrame::decode(&text);
    }

    #[test]
    fn decode_never_panics_on_objects(
        tag in prop::option::of("[a-z]{0,8}"),
        payload in ".{0,64}",
    ) {
        let mut object = serde_json::Map::new();
        if let Some(tag) = tag {
            object.insert("type".into(), tag.into());
        }
        object.insert("status".into(), payload.clone().into());
        object.insert("content".into(), payload.into());
        let text = serde_json::Value::Object(object).to_string();

        let frame = InboundFrame::decode(&text);
        prop_assert!(frame.is_ok());
    }

    #[test]
    fn text_chunks_preserve_content(text in ".{0,128}") {
        let encoded = InboundFrame::encode_chunk(&ContentItem::text(text.clone()));
        let frame = InboundFrame::decode(&encoded).unwrap();
        prop_assert_eq!(frame.kind(), &FrameKind::Chunk(ContentItem::text(text)));
    }

    #[test]
    fn status_frames_classified(status in arbitrary_status()) {
        let frame = InboundFrame::decode(&InboundFrame::encode_status(status)).unwrap();
        prop_assert_eq!(frame.kind(), &FrameKind::Status(status));
    }

    #[test]
    fn unknown_tags_route_to_other(tag in "[a-z]{1,12}") {
        prop_assume!(!["status", "chunk", "md"].contains(&tag.as_str()));
        let text = serde_json::json!({"type": tag.clone()}).to_string();
        let frame = InboundFrame::decode(&text).unwrap();
        prop_assert_eq!(frame.kind(), &FrameKind::Other { tag: Some(tag) });
    }
}
