//! Keeping selection highlights anchored while the document changes.
//!
//! Each selection is re-located with a fallback chain, stopping at the
//! first step that succeeds:
//!
//! 1. stored range, if it is in bounds and still covers exactly the text
//! 2. first block (in document order) whose text equals the selection, or
//!    failing that contains it
//! 3. first occurrence anywhere in the document's concatenated block text,
//!    which may span blocks
//!
//! A selection none of these can locate stays in the set unhighlighted by
//! [`resync`]. [`on_document_changed`] removes such selections first, since
//! their text no longer exists.

use tracing::debug;

use crate::{
    document::{Block, DocumentSurface, TextRange, char_offset},
    selection::{SelectionId, SelectionItem, SelectionSet},
};

/// Which step of the fallback chain located a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Stored range still valid.
    Stored,
    /// A block's whole text.
    Block,
    /// A substring of one block.
    WithinBlock,
    /// A match in the concatenated document text.
    Document,
}

/// Where a selection currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Range to highlight.
    pub range: TextRange,
    /// How it was found.
    pub anchor: Anchor,
}

/// Outcome of one highlight pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightReport {
    /// Highlighted selections.
    pub anchored: Vec<(SelectionId, Resolved)>,
    /// Selections that could not be located.
    pub unanchored: Vec<SelectionId>,
}

/// Outcome of [`on_document_changed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Selections removed because their text disappeared.
    pub removed: Vec<SelectionItem>,
    /// Highlight pass over what remained.
    pub highlights: HighlightReport,
}

/// Locate `item` in `doc`.
pub fn resolve_range<D: DocumentSurface + ?Sized>(item: &SelectionItem, doc: &D) -> Option<Resolved> {
    if let Some(range) = item.stored_range()
        && !range.is_empty()
        && range.to <= doc.size()
        && doc.text_between(range.from, range.to) == item.text
    {
        return Some(Resolved { range, anchor: Anchor::Stored });
    }

    let blocks = doc.blocks();

    for block in &blocks {
        if block.text == item.text {
            return Some(Resolved { range: block.content_range(), anchor: Anchor::Block });
        }
        if let Some(offset) = char_offset(&block.text, &item.text) {
            let from = block.start + offset;
            let range = TextRange::new(from, from + item.text.chars().count());
            return Some(Resolved { range, anchor: Anchor::WithinBlock });
        }
    }

    let joined: String = blocks.iter().map(|block| block.text.as_str()).collect();
    let start = char_offset(&joined, &item.text)?;
    let end = start + item.text.chars().count();
    let range = TextRange::new(map_start(&blocks, start)?, map_end(&blocks, end)?);

    Some(Resolved { range, anchor: Anchor::Document })
}

/// Clear every highlight, then highlight each selection that can be
/// located. Never mutates the selection set.
pub fn resync<D: DocumentSurface + ?Sized>(selections: &SelectionSet, doc: &mut D) -> HighlightReport {
    doc.clear_highlights();

    let mut report = HighlightReport::default();
    for item in selections.items() {
        match resolve_range(item, doc) {
            Some(resolved) => {
                doc.apply_highlight(resolved.range, &item.color);
                report.anchored.push((item.id.clone(), resolved));
            },
            None => report.unanchored.push(item.id.clone()),
        }
    }

    if !report.unanchored.is_empty() {
        debug!(count = report.unanchored.len(), "selections without highlight");
    }
    report
}

/// React to a document edit: drop selections whose text no longer appears
/// anywhere, then re-highlight the rest.
pub fn on_document_changed<D: DocumentSurface + ?Sized>(
    selections: &mut SelectionSet,
    doc: &mut D,
) -> SyncReport {
    let full_text: String = doc.blocks().iter().map(|block| block.text.as_str()).collect();
    let removed = selections.retain(|item| full_text.contains(&item.text));

    for item in &removed {
        debug!(id = %item.id, "selection text removed from document");
    }

    let highlights = resync(selections, doc);
    SyncReport { removed, highlights }
}

/// Position of the character at `offset` in the concatenated block text.
fn map_start(blocks: &[Block], offset: usize) -> Option<usize> {
    let mut consumed = 0;
    for block in blocks {
        let len = block.text.chars().count();
        if offset < consumed + len {
            return Some(block.start + (offset - consumed));
        }
        consumed += len;
    }
    None
}

/// Position just past the character ending at `offset`.
fn map_end(blocks: &[Block], offset: usize) -> Option<usize> {
    let mut consumed = 0;
    for block in blocks {
        let len = block.text.chars().count();
        if offset > consumed && offset <= consumed + len {
            return Some(block.start + (offset - consumed));
        }
        consumed += len;
    }
    None
}
