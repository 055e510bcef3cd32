//! Checks registered by [`InvariantRegistry::standard`](super::InvariantRegistry::standard).

use quill_app::StreamPhase;
use quill_core::SessionPhase;
use quill_proto::ContentItem;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// No two selections carry the same text.
pub struct UniqueSelectionTexts;

impl Invariant for UniqueSelectionTexts {
    fn name(&self) -> &'static str {
        "unique_selection_texts"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, text) in state.selection_texts.iter().enumerate() {
            if state.selection_texts[..i].contains(text) {
                let message = format!("selection text {text:?} appears twice");
                return Err(Violation::new(self.name(), message));
            }
        }
        Ok(())
    }
}

/// Reconnect attempts never exceed the configured budget.
pub struct ReconnectBound;

impl Invariant for ReconnectBound {
    fn name(&self) -> &'static str {
        "reconnect_bound"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(session) = &state.session else {
            return Ok(());
        };
        if session.reconnect_attempts > state.max_reconnect_attempts {
            let message = format!(
                "{} reconnect attempts, budget {}",
                session.reconnect_attempts, state.max_reconnect_attempts
            );
            return Err(Violation::new(self.name(), message));
        }
        Ok(())
    }
}

/// A pending reconnect only exists while the socket is closed.
///
/// A pending timer while connecting or open would mean two sockets could be
/// live at once.
pub struct PendingReconnectImpliesDisconnected;

impl Invariant for PendingReconnectImpliesDisconnected {
    fn name(&self) -> &'static str {
        "pending_reconnect_implies_disconnected"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let Some(session) = &state.session else {
            return Ok(());
        };
        if session.reconnect_pending && session.phase != SessionPhase::Closed {
            let message = format!("reconnect pending in phase {:?}", session.phase);
            return Err(Violation::new(self.name(), message));
        }
        Ok(())
    }
}

/// The reply buffer is empty whenever no reply is in progress.
pub struct IdleStreamEmpty;

impl Invariant for IdleStreamEmpty {
    fn name(&self) -> &'static str {
        "idle_stream_empty"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        if state.stream_phase == StreamPhase::Idle && !state.stream_buffer.is_empty() {
            let message = format!("idle with {} buffered items", state.stream_buffer.len());
            return Err(Violation::new(self.name(), message));
        }
        Ok(())
    }
}

/// Consecutive text chunks are merged, so the buffer never holds two
/// adjacent text items.
pub struct NoAdjacentText;

impl Invariant for NoAdjacentText {
    fn name(&self) -> &'static str {
        "no_adjacent_text"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for (i, pair) in state.stream_buffer.windows(2).enumerate() {
            if matches!(pair, [ContentItem::Text { .. }, ContentItem::Text { .. }]) {
                let message = format!("text items at {i} and {} not merged", i + 1);
                return Err(Violation::new(self.name(), message));
            }
        }
        Ok(())
    }
}

/// The transcript only grows, except when cleared to empty.
pub struct TranscriptGrowth;

impl Invariant for TranscriptGrowth {
    fn name(&self) -> &'static str {
        "transcript_growth"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for window in state.transcript_history.windows(2) {
            if window[1] < window[0] && window[1] != 0 {
                let message = format!("transcript shrank {} → {}", window[0], window[1]);
                return Err(Violation::new(self.name(), message));
            }
        }
        Ok(())
    }
}
