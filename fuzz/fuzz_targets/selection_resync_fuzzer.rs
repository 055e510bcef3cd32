//! Fuzz target for selection highlight sync
//!
//! Ensure highlights always cover exactly the selected text
//!
//! # Strategy
//!
//! - Documents: a few short paragraphs over a tiny alphabet so matches,
//!   repeats and cross-paragraph hits are common
//! - Selections: substrings of the document, text spanning paragraphs, and
//!   stored ranges that may be stale or out of bounds
//! - Edits: replace, append and remove paragraphs, then sync
//!
//! # Invariants
//!
//! - Every highlight lies inside the document
//! - Every highlight's text equals its selection's text
//! - After a sync, every remaining selection's text is in the document
//! - Selection texts stay unique

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quill_app::{
    highlight, DocumentSurface, NewSelection, SelectionSet, TextDocument, TextRange,
};

#[derive(Debug, Clone, Arbitrary)]
enum SyncOp {
    Select { text: Word, range: Option<(u8, u8)> },
    Edit { block: u8, text: Word },
    Append { text: Word },
    Remove { block: u8 },
    Resync,
}

/// Short text over a tiny alphabet.
#[derive(Debug, Clone, Arbitrary)]
struct Word(Vec<u8>);

impl Word {
    fn render(&self) -> String {
        const ALPHABET: &[u8] = b"ab ";
        self.0.iter().take(8).map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char).collect()
    }
}

fuzz_target!(|input: (Vec<Word>, Vec<SyncOp>)| {
    let (blocks, ops) = input;
    let mut doc = TextDocument::from_blocks(blocks.iter().take(6).map(Word::render));
    let mut selections = SelectionSet::new();

    for op in ops.into_iter().take(64) {
        let report = match op {
            SyncOp::Select { text, range } => {
                let mut selection = NewSelection::new(text.render());
                if let Some((from, to)) = range {
                    selection = selection.with_range(TextRange::new(from.into(), to.into()));
                }
                let _ = selections.add(selection);
                highlight::resync(&selections, &mut doc)
            }
            SyncOp::Edit { block, text } => {
                doc.set_block(usize::from(block), text.render());
                sync(&mut selections, &mut doc)
            }
            SyncOp::Append { text } => {
                doc.push_block(text.render());
                sync(&mut selections, &mut doc)
            }
            SyncOp::Remove { block } => {
                doc.remove_block(usize::from(block));
                sync(&mut selections, &mut doc)
            }
            SyncOp::Resync => highlight::resync(&selections, &mut doc),
        };

        for (id, resolved) in &report.anchored {
            let range = resolved.range;
            assert!(range.from < range.to && range.to <= doc.size(), "{range:?} outside document");
            let item = selections.get(id).expect("anchored selection exists");
            assert_eq!(doc.text_between(range.from, range.to), item.text);
        }

        let unique: HashSet<&str> = selections.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(unique.len(), selections.len());
    }
});

fn sync(selections: &mut SelectionSet, doc: &mut TextDocument) -> highlight::HighlightReport {
    let report = highlight::on_document_changed(selections, doc);
    let full_text: String = doc.blocks().into_iter().map(|b| b.text).collect();
    for item in selections.items() {
        assert!(full_text.contains(&item.text), "stale selection {item:?} kept");
    }
    report.highlights
}
