//! Fuzz target for InboundFrame::decode
//!
//! This fuzzer feeds arbitrary text to the inbound frame decoder to find:
//! - Parser crashes or panics
//! - Frames that decode to a status or chunk without the fields they need
//! - Deeply nested JSON that blows the stack
//!
//! The fuzzer should NEVER panic. Invalid input returns an error or decodes
//! to `FrameKind::Invalid`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quill_proto::{FrameKind, InboundFrame};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let Ok(frame) = InboundFrame::decode(&text) else {
        return;
    };

    // A decoded chunk or status must carry its tag
    match frame.kind() {
        FrameKind::Status(_) => assert_eq!(frame.tag(), Some("status")),
        FrameKind::Chunk(_) => assert!(matches!(frame.tag(), Some("chunk" | "md"))),
        FrameKind::Other { .. } | FrameKind::Invalid { .. } => {}
    }
});
