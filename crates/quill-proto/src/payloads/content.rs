//! Content items streamed by the backend.

use serde::{Deserialize, Serialize};

/// One unit of message content.
///
/// Tagged on `type`:
///
/// ```json
/// {"type": "text", "text": "Hello"}
/// {"type": "element", "element": {"type": "code_block", "content": {...}}}
/// ```
///
/// Consecutive text items in a streamed reply are merged by the assembler;
/// elements are always kept as separate items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// Plain text run.
    Text {
        /// Text content.
        text: String,
    },
    /// Structured UI element.
    Element {
        /// The element payload.
        element: UiElement,
    },
}

impl ContentItem {
    /// Text item.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Element item.
    pub fn element(element: UiElement) -> Self {
        Self::Element { element }
    }

    /// Text of a text item, `None` for elements.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Element { .. } => None,
        }
    }
}

/// Structured element rendered alongside text.
///
/// Tagged adjacently: the element kind in `type`, its payload in `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum UiElement {
    /// Search result card.
    WebSearch(WebSearch),
    /// Fenced code.
    CodeBlock(CodeBlock),
    /// File listing.
    FileTree(FileTree),
    /// Inline image.
    Image(Image),
}

impl UiElement {
    /// Wire name of the element kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WebSearch(_) => "web_search",
            Self::CodeBlock(_) => "code_block",
            Self::FileTree(_) => "file_tree",
            Self::Image(_) => "image",
        }
    }
}

/// Web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearch {
    /// Result title.
    pub title: String,
    /// Result URL.
    pub url: String,
    /// Extract shown under the title.
    pub snippet: String,
}

/// Code block with a language hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    /// Language name used for highlighting.
    pub language: String,
    /// Source text.
    pub code: String,
}

/// Flat list of file paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTree {
    /// Paths, in display order.
    pub files: Vec<String>,
}

/// Image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image source URL.
    pub src: String,
    /// Alt text.
    pub alt: String,
    /// Width in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}
