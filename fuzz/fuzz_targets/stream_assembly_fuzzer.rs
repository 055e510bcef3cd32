//! Fuzz target for streamed reply assembly
//!
//! Drives the assembler and transcript with arbitrary status and chunk
//! sequences.
//!
//! # Invariants
//!
//! - No two adjacent text items in the buffer or in a committed message
//! - The buffer is empty whenever the assembler is idle
//! - The transcript only grows, by at most one message per status
//! - `error` never adds a message

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quill_app::{StreamAssembler, StreamOutcome, StreamPhase, Transcript};
use quill_proto::{CodeBlock, ContentItem, StreamStatus, UiElement};

#[derive(Debug, Clone, Arbitrary)]
enum StreamOp {
    Thinking,
    Complete,
    Error,
    Text(String),
    Code(String),
}

fn no_adjacent_text(items: &[ContentItem]) -> bool {
    items.windows(2).all(|pair| !(pair[0].as_text().is_some() && pair[1].as_text().is_some()))
}

fuzz_target!(|ops: Vec<StreamOp>| {
    let mut assembler = StreamAssembler::new();
    let mut transcript = Transcript::new();

    for op in ops {
        let before = transcript.len();
        let status = match op {
            StreamOp::Thinking => Some(StreamStatus::Thinking),
            StreamOp::Complete => Some(StreamStatus::Complete),
            StreamOp::Error => Some(StreamStatus::Error),
            StreamOp::Text(text) => {
                let in_reply = assembler.is_active();
                assert_eq!(assembler.on_chunk(ContentItem::text(text)), in_reply);
                None
            }
            StreamOp::Code(code) => {
                let in_reply = assembler.is_active();
                let accepted = assembler.on_chunk(ContentItem::element(UiElement::CodeBlock(CodeBlock {
                    language: "rust".into(),
                    code,
                })));
                assert_eq!(accepted, in_reply);
                None
            }
        };

        if let Some(status) = status {
            match assembler.on_status(status) {
                StreamOutcome::Armed { flushed: Some(content) } | StreamOutcome::Committed(content) => {
                    transcript.commit(content);
                }
                StreamOutcome::Armed { flushed: None }
                | StreamOutcome::Empty
                | StreamOutcome::Discarded { .. } => {}
            }
            assert!(transcript.len() <= before + 1);
            if status == StreamStatus::Error {
                assert_eq!(transcript.len(), before);
            }
        }

        assert!(transcript.len() >= before);
        assert!(no_adjacent_text(assembler.buffer()));
        if assembler.phase() == StreamPhase::Idle {
            assert!(assembler.buffer().is_empty());
        }
    }

    for message in transcript.messages() {
        assert!(no_adjacent_text(&message.content));
    }
});
