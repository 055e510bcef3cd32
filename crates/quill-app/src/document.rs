//! Document surface used for text selections and highlights.
//!
//! Positions follow the block-document convention: the document is a
//! sequence of blocks, each costing one position for its opening boundary,
//! one per character, and one for its closing boundary. A block starting at
//! position `p` has its text at `p + 1 .. p + 1 + len`. Positions count
//! characters, not bytes.
//!
//! ```text
//!   block "ab"        block "c"
//! ┌───┬───┬───┬───┐ ┌───┬───┬───┐
//! │ < │ a │ b │ > │ │ < │ c │ > │
//! └───┴───┴───┴───┘ └───┴───┴───┘
//!   0   1   2   3     4   5   6      size = 7
//! ```

/// Half-open position range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    /// Start position.
    pub from: usize,
    /// End position (exclusive).
    pub to: usize,
}

impl TextRange {
    /// Range `[from, to)`.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// True if the range covers no positions.
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

/// A text block and where its text starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Position of the first character.
    pub start: usize,
    /// Block text.
    pub text: String,
}

impl Block {
    /// Range covering the block's text.
    pub fn content_range(&self) -> TextRange {
        TextRange::new(self.start, self.start + self.text.chars().count())
    }
}

/// Visual mark applied to a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    /// Highlighted range.
    pub range: TextRange,
    /// Palette color name.
    pub color: String,
}

/// Document capabilities the selection engine relies on.
pub trait DocumentSurface {
    /// Current user selection, if any.
    fn selection(&self) -> Option<TextRange>;

    /// Text between two positions. Boundary positions contribute nothing, so
    /// text spanning blocks is concatenated without separators.
    fn text_between(&self, from: usize, to: usize) -> String;

    /// Total size in positions.
    fn size(&self) -> usize;

    /// Text blocks in document order.
    fn blocks(&self) -> Vec<Block>;

    /// Mark a range.
    fn apply_highlight(&mut self, range: TextRange, color: &str);

    /// Remove every highlight.
    fn clear_highlights(&mut self);
}

/// In-memory document made of plain-text paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    blocks: Vec<String>,
    selection: Option<TextRange>,
    highlights: Vec<Highlight>,
}

impl TextDocument {
    /// Empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document from blocks.
    pub fn from_blocks<I, S>(blocks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { blocks: blocks.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    /// Document from text, one block per paragraph. Paragraphs are separated
    /// by blank lines.
    pub fn from_text(text: &str) -> Self {
        let mut blocks = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    blocks.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line.trim());
            }
        }
        if !current.is_empty() {
            blocks.push(current.join(" "));
        }

        Self::from_blocks(blocks)
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Text of block `index`.
    pub fn block(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(String::as_str)
    }

    /// Replace the text of block `index`. Returns false if out of range.
    pub fn set_block(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) => {
                *block = text.into();
                true
            },
            None => false,
        }
    }

    /// Append a block.
    pub fn push_block(&mut self, text: impl Into<String>) {
        self.blocks.push(text.into());
    }

    /// Remove block `index`.
    pub fn remove_block(&mut self, index: usize) -> Option<String> {
        (index < self.blocks.len()).then(|| self.blocks.remove(index))
    }

    /// Set the user selection.
    pub fn select(&mut self, range: Option<TextRange>) {
        self.selection = range;
    }

    /// Range of the first occurrence of `needle` inside a single block.
    pub fn find(&self, needle: &str) -> Option<TextRange> {
        if needle.is_empty() {
            return None;
        }
        self.blocks().into_iter().find_map(|block| {
            let offset = char_offset(&block.text, needle)?;
            let start = block.start + offset;
            Some(TextRange::new(start, start + needle.chars().count()))
        })
    }

    /// Highlights currently applied.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Blocks joined by blank lines.
    pub fn plain_text(&self) -> String {
        self.blocks.join("\n\n")
    }
}

impl DocumentSurface for TextDocument {
    fn selection(&self) -> Option<TextRange> {
        self.selection
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        let mut out = String::new();
        for block in self.blocks() {
            let content = block.content_range();
            let start = from.max(content.from);
            let end = to.min(content.to);
            if start < end {
                out.extend(block.text.chars().skip(start - content.from).take(end - start));
            }
        }
        out
    }

    fn size(&self) -> usize {
        self.blocks.iter().map(|b| b.chars().count() + 2).sum()
    }

    fn blocks(&self) -> Vec<Block> {
        let mut pos = 0;
        self.blocks
            .iter()
            .map(|text| {
                let block = Block { start: pos + 1, text: text.clone() };
                pos += text.chars().count() + 2;
                block
            })
            .collect()
    }

    fn apply_highlight(&mut self, range: TextRange, color: &str) {
        self.highlights.push(Highlight { range, color: color.to_owned() });
    }

    fn clear_highlights(&mut self) {
        self.highlights.clear();
    }
}

/// Character offset of the first occurrence of `needle` in `haystack`.
pub(crate) fn char_offset(haystack: &str, needle: &str) -> Option<usize> {
    haystack.find(needle).map(|byte| haystack[..byte].chars().count())
}
