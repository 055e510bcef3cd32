//! Text selections attached to the next chat message.
//!
//! The user picks passages from the document; each becomes a
//! [`SelectionItem`] with a palette color and, when known, the document
//! range it was taken from. On submit the selected texts are prepended to
//! the draft.
//!
//! # Invariants
//!
//! - No two items have the same text.
//! - Item text is trimmed and non-empty.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::document::TextRange;

/// Highlight colors, assigned round-robin by insertion count.
pub const SELECTION_PALETTE: [&str; 8] =
    ["blue", "green", "purple", "amber", "rose", "teal", "indigo", "orange"];

/// Errors from [`SelectionSet::add`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Selected text was empty after trimming.
    #[error("selection is empty")]
    Empty,

    /// Same text is already selected.
    #[error("text already selected")]
    Duplicate {
        /// Id of the existing item.
        existing: SelectionId,
    },
}

/// Selection identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionId(String);

impl SelectionId {
    /// Id from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A selected passage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Identifier.
    pub id: SelectionId,
    /// Trimmed passage text.
    pub text: String,
    /// Palette color.
    pub color: String,
    /// Start position when captured.
    pub from: Option<usize>,
    /// End position when captured.
    pub to: Option<usize>,
}

impl SelectionItem {
    /// Stored range, if both ends are known.
    pub fn stored_range(&self) -> Option<TextRange> {
        Some(TextRange::new(self.from?, self.to?))
    }
}

/// Request to add a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSelection {
    /// Raw selected text. Trimmed on insert.
    pub text: String,
    /// Explicit id. Generated when absent.
    pub id: Option<SelectionId>,
    /// Explicit color. Taken from the palette when absent.
    pub color: Option<String>,
    /// Start position.
    pub from: Option<usize>,
    /// End position.
    pub to: Option<usize>,
}

impl NewSelection {
    /// Selection of `text` with no position.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    /// Record where the text was taken from.
    #[must_use]
    pub fn with_range(mut self, range: TextRange) -> Self {
        self.from = Some(range.from);
        self.to = Some(range.to);
        self
    }

    /// Use an explicit id.
    #[must_use]
    pub fn with_id(mut self, id: SelectionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Use an explicit color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Ordered collection of selections.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    items: Vec<SelectionItem>,
    next_id: u64,
}

impl SelectionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a selection.
    ///
    /// # Errors
    ///
    /// - `SelectionError::Empty` if the text is blank
    /// - `SelectionError::Duplicate` if the same text is already selected
    pub fn add(&mut self, selection: NewSelection) -> Result<SelectionId, SelectionError> {
        let text = selection.text.trim();
        if text.is_empty() {
            return Err(SelectionError::Empty);
        }

        if let Some(existing) = self.items.iter().find(|item| item.text == text) {
            debug!(id = %existing.id, "duplicate selection ignored");
            return Err(SelectionError::Duplicate { existing: existing.id.clone() });
        }

        let color = selection
            .color
            .unwrap_or_else(|| SELECTION_PALETTE[self.items.len() % SELECTION_PALETTE.len()].to_owned());
        let id = match selection.id {
            Some(id) if !self.contains_id(&id) => id,
            Some(taken) => {
                let id = self.allocate_id();
                debug!(%taken, %id, "selection id in use, reassigned");
                id
            },
            None => self.allocate_id(),
        };

        self.items.push(SelectionItem {
            id: id.clone(),
            text: text.to_owned(),
            color,
            from: selection.from,
            to: selection.to,
        });
        Ok(id)
    }

    /// Remove the item with `id`.
    pub fn remove(&mut self, id: &SelectionId) -> Option<SelectionItem> {
        self.retain(|item| &item.id != id).into_iter().next()
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keep only items for which `keep` returns true. Returns the removed
    /// items.
    pub fn retain(&mut self, mut keep: impl FnMut(&SelectionItem) -> bool) -> Vec<SelectionItem> {
        let (kept, removed): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.items).into_iter().partition(|item| keep(item));
        self.items = kept;
        removed
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    /// Item by id.
    pub fn get(&self, id: &SelectionId) -> Option<&SelectionItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Message text to send for `draft`.
    ///
    /// Selected texts joined by blank lines, followed by the draft after one
    /// more blank line. With no selections the draft is returned unchanged.
    pub fn compose_submission(&self, draft: &str) -> String {
        if self.items.is_empty() {
            return draft.to_owned();
        }

        let mut text =
            self.items.iter().map(|item| item.text.as_str()).collect::<Vec<_>>().join("\n\n");
        if !draft.is_empty() {
            text.push_str("\n\n");
            text.push_str(draft);
        }
        text
    }

    fn contains_id(&self, id: &SelectionId) -> bool {
        self.items.iter().any(|item| &item.id == id)
    }

    /// Next `sel-N` not held by any item, explicit ids included.
    fn allocate_id(&mut self) -> SelectionId {
        loop {
            self.next_id += 1;
            let id = SelectionId(format!("sel-{}", self.next_id));
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}
