//! Streaming reply assembly.
//!
//! The backend streams a reply as a `thinking` status, a run of content
//! chunks, then `complete` (or `error`). [`StreamAssembler`] buffers the
//! chunks, merging consecutive text runs, and hands the finished content to
//! the caller on `complete`.
//!
//! # Invariants
//!
//! - The buffer never holds two adjacent text items.
//! - The buffer is empty whenever the phase is [`StreamPhase::Idle`].
//! - A reply is committed at most once; `error` discards it.
//! - Chunks count only between `thinking` and the closing status.

use quill_proto::{ContentItem, StreamStatus};
use tracing::{debug, warn};

/// Assembly phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamPhase {
    /// No reply in progress.
    #[default]
    Idle,
    /// `thinking` received, no content yet.
    Thinking,
    /// At least one chunk buffered.
    Streaming,
}

/// What a status transition did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// A reply was armed. Holds content flushed from an unfinished previous
    /// reply, if there was any.
    Armed {
        /// Content committed from the interrupted reply.
        flushed: Option<Vec<ContentItem>>,
    },
    /// Reply finished with content to commit.
    Committed(Vec<ContentItem>),
    /// Reply finished empty; nothing to commit.
    Empty,
    /// Reply abandoned.
    Discarded {
        /// Items dropped.
        items: usize,
    },
}

/// Buffers chunks of the reply being streamed.
#[derive(Debug, Clone, Default)]
pub struct StreamAssembler {
    phase: StreamPhase,
    buffer: Vec<ContentItem>,
}

impl StreamAssembler {
    /// Idle assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Content buffered so far.
    pub fn buffer(&self) -> &[ContentItem] {
        &self.buffer
    }

    /// True while a reply is in progress.
    pub fn is_active(&self) -> bool {
        self.phase != StreamPhase::Idle
    }

    /// Apply a status transition.
    ///
    /// A `thinking` that arrives mid-reply commits what was buffered before
    /// arming the new reply, so no content is lost.
    pub fn on_status(&mut self, status: StreamStatus) -> StreamOutcome {
        match status {
            StreamStatus::Thinking => {
                let flushed = self.take_buffer();
                if flushed.is_some() {
                    warn!("thinking arrived mid-reply, committing partial reply");
                }
                self.phase = StreamPhase::Thinking;
                StreamOutcome::Armed { flushed }
            },
            StreamStatus::Complete => {
                self.phase = StreamPhase::Idle;
                match self.take_buffer() {
                    Some(content) => {
                        debug!(items = content.len(), "reply complete");
                        StreamOutcome::Committed(content)
                    },
                    None => StreamOutcome::Empty,
                }
            },
            StreamStatus::Error => {
                let items = self.buffer.len();
                self.buffer.clear();
                self.phase = StreamPhase::Idle;
                debug!(items, "reply discarded");
                StreamOutcome::Discarded { items }
            },
        }
    }

    /// Append a chunk. Returns false if no reply is in progress, in which
    /// case the chunk is dropped.
    ///
    /// Text merges into a trailing text item; elements always start a new
    /// item.
    pub fn on_chunk(&mut self, item: ContentItem) -> bool {
        if self.phase == StreamPhase::Idle {
            debug!("chunk outside a reply dropped");
            return false;
        }
        self.phase = StreamPhase::Streaming;

        if let (Some(ContentItem::Text { text: tail }), ContentItem::Text { text }) =
            (self.buffer.last_mut(), &item)
        {
            tail.push_str(text);
        } else {
            self.buffer.push(item);
        }
        true
    }

    fn take_buffer(&mut self) -> Option<Vec<ContentItem>> {
        if self.buffer.is_empty() { None } else { Some(std::mem::take(&mut self.buffer)) }
    }
}

#[cfg(test)]
mod tests {
    use quill_proto::{CodeBlock, UiElement};

    use super::*;

    fn code() -> ContentItem {
        ContentItem::element(UiElement::CodeBlock(CodeBlock {
            language: "rust".into(),
            code: "let x = 1;".into(),
        }))
    }

    #[test]
    fn text_chunks_merge() {
        let mut stream = StreamAssembler::new();
        stream.on_status(StreamStatus::Thinking);
        stream.on_chunk(ContentItem::text("Hel"));
        stream.on_chunk(ContentItem::text("lo"));

        assert_eq!(
            stream.on_status(StreamStatus::Complete),
            StreamOutcome::Committed(vec![ContentItem::text("Hello")])
        );
        assert_eq!(stream.phase(), StreamPhase::Idle);
    }

    #[test]
    fn elements_break_text_runs() {
        let mut stream = StreamAssembler::new();
        stream.on_status(StreamStatus::Thinking);
        stream.on_chunk(ContentItem::text("a"));
        stream.on_chunk(code());
        stream.on_chunk(ContentItem::text("b"));
        stream.on_chunk(ContentItem::text("c"));

        assert_eq!(
            stream.buffer(),
            &[ContentItem::text("a"), code(), ContentItem::text("bc")]
        );
    }

    #[test]
    fn error_discards() {
        let mut stream = StreamAssembler::new();
        stream.on_status(StreamStatus::Thinking);
        stream.on_chunk(ContentItem::text("partial"));

        assert_eq!(stream.on_status(StreamStatus::Error), StreamOutcome::Discarded { items: 1 });
        assert!(stream.buffer().is_empty());
        assert_eq!(stream.phase(), StreamPhase::Idle);
    }

    #[test]
    fn complete_without_content_is_empty() {
        let mut stream = StreamAssembler::new();
        stream.on_status(StreamStatus::Thinking);
        assert_eq!(stream.on_status(StreamStatus::Complete), StreamOutcome::Empty);
    }

    #[test]
    fn complete_twice_commits_once() {
        let mut stream = StreamAssembler::new();
        stream.on_status(StreamStatus::Thinking);
        stream.on_chunk(ContentItem::text("x"));
        assert!(matches!(stream.on_status(StreamStatus::Complete), StreamOutcome::Committed(_)));
        assert_eq!(stream.on_status(StreamStatus::Complete), StreamOutcome::Empty);
    }

    #[test]
    fn thinking_mid_reply_flushes() {
        let mut stream = StreamAssembler::new();
        stream.on_status(StreamStatus::Thinking);
        stream.on_chunk(ContentItem::text("first"));

        assert_eq!(
            stream.on_status(StreamStatus::Thinking),
            StreamOutcome::Armed { flushed: Some(vec![ContentItem::text("first")]) }
        );
        assert_eq!(stream.phase(), StreamPhase::Thinking);
        assert!(stream.buffer().is_empty());
    }

    #[test]
    fn chunk_while_idle_dropped() {
        let mut stream = StreamAssembler::new();
        assert!(!stream.on_chunk(ContentItem::text("early")));
        assert_eq!(stream.phase(), StreamPhase::Idle);
        assert!(stream.buffer().is_empty());

        stream.on_status(StreamStatus::Thinking);
        stream.on_chunk(ContentItem::text("x"));
        stream.on_status(StreamStatus::Complete);
        assert!(!stream.on_chunk(ContentItem::text("late")));
        assert_eq!(stream.on_status(StreamStatus::Complete), StreamOutcome::Empty);
    }
}
