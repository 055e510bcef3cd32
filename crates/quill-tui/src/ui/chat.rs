//! Chat area
//!
//! Displays the transcript followed by the reply in flight.

use quill_app::{App, StreamPhase};
use quill_proto::{ContentItem, Role, UiElement};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" {} ", app.selected_model().label());
    let block = Block::default().borders(Borders::ALL).title(title);

    let mut lines = Vec::new();
    for message in app.transcript().messages() {
        lines.extend(content_lines(message.role, &message.content));
    }

    match app.stream().phase() {
        StreamPhase::Thinking => lines.push(dim("thinking...")),
        StreamPhase::Streaming => {
            lines.extend(content_lines(Role::Ai, app.stream().buffer()));
        },
        StreamPhase::Idle => {},
    }

    if lines.is_empty() {
        lines.push(dim("Select passages with /select, then ask a question"));
    }

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = lines.len().saturating_sub(visible_height);
    let items: Vec<ListItem> = lines.into_iter().skip(skip).map(ListItem::new).collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Lines for one message. The first line carries the author tag.
fn content_lines(role: Role, content: &[ContentItem]) -> Vec<Line<'static>> {
    let (tag, color) = match role {
        Role::User => ("you", Color::Green),
        Role::Ai => ("ai", Color::Cyan),
    };

    let mut body: Vec<Line<'static>> = Vec::new();
    for item in content {
        match item {
            ContentItem::Text { text } => {
                body.extend(text.lines().map(|line| Line::from(line.to_owned())));
            },
            ContentItem::Element { element } => body.extend(element_lines(element)),
        }
    }

    let prefix = Span::styled(format!("<{tag}> "), Style::default().fg(color).add_modifier(Modifier::BOLD));
    match body.first_mut() {
        Some(first) => first.spans.insert(0, prefix),
        None => body.push(Line::from(prefix)),
    }
    body
}

fn element_lines(element: &UiElement) -> Vec<Line<'static>> {
    let accent = Style::default().fg(Color::Yellow);
    match element {
        UiElement::WebSearch(result) => vec![
            Line::from(Span::styled(format!("[web] {}", result.title), accent)),
            dim(&format!("      {}", result.url)),
            Line::from(format!("      {}", result.snippet)),
        ],
        UiElement::CodeBlock(code) => {
            let mut lines = vec![Line::from(Span::styled(format!("```{}", code.language), accent))];
            lines.extend(code.code.lines().map(|line| Line::from(line.to_owned())));
            lines.push(Line::from(Span::styled("```", accent)));
            lines
        },
        UiElement::FileTree(tree) => {
            let mut lines = vec![Line::from(Span::styled("[files]", accent))];
            lines.extend(tree.files.iter().map(|path| Line::from(format!("  {path}"))));
            lines
        },
        UiElement::Image(image) => {
            vec![Line::from(Span::styled(format!("[image] {} ({})", image.alt, image.src), accent))]
        },
    }
}

fn dim(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_owned(), Style::default().fg(Color::DarkGray)))
}

#[cfg(test)]
mod tests {
    use quill_proto::{CodeBlock, FileTree, Image, WebSearch};

    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect()).collect()
    }

    #[test]
    fn author_tag_on_first_line() {
        let lines = content_lines(Role::User, &[ContentItem::text("one\ntwo")]);
        assert_eq!(plain(&lines), ["<you> one", "two"]);
    }

    #[test]
    fn elements_render_after_text() {
        let lines = content_lines(Role::Ai, &[
            ContentItem::text("See:"),
            ContentItem::element(UiElement::CodeBlock(CodeBlock {
                language: "rust".into(),
                code: "fn main() {}".into(),
            })),
            ContentItem::element(UiElement::WebSearch(WebSearch {
                title: "Report".into(),
                url: "https://example.com".into(),
                snippet: "Q3".into(),
            })),
        ]);

        insta::assert_snapshot!(plain(&lines).join("\n"), @r"
        <ai> See:
        ```rust
        fn main() {}
        ```
        [web] Report
              https://example.com
              Q3
        ");
    }

    #[test]
    fn file_tree_and_image_lines() {
        let lines = content_lines(Role::Ai, &[
            ContentItem::element(UiElement::FileTree(FileTree {
                files: vec!["src/lib.rs".into(), "Cargo.toml".into()],
            })),
            ContentItem::element(UiElement::Image(Image {
                src: "chart.png".into(),
                alt: "Q3 chart".into(),
                width: None,
                height: None,
            })),
        ]);

        insta::assert_snapshot!(plain(&lines).join("\n"), @r"
        <ai> [files]
          src/lib.rs
          Cargo.toml
        [image] Q3 chart (chart.png)
        ");
    }

    #[test]
    fn empty_message_still_tagged() {
        let lines = content_lines(Role::Ai, &[]);
        assert_eq!(plain(&lines), ["<ai> "]);
    }
}
