//! Document pane
//!
//! Shows the document paragraphs with selection highlights.

use quill_app::{App, Block as TextBlock, DocumentSurface, Highlight, TextDocument};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::palette_color;

/// Render the document pane.
pub fn render(frame: &mut Frame, app: &App, doc: &TextDocument, area: Rect) {
    let title = match app.selections().len() {
        0 => " Document ".to_owned(),
        n => format!(" Document ({n} selected) "),
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let blocks = doc.blocks();
    let lines: Vec<Line> = if blocks.is_empty() {
        vec![Line::from(Span::styled("No document loaded", Style::default().fg(Color::DarkGray)))]
    } else {
        blocks
            .iter()
            .enumerate()
            .map(|(index, text_block)| paragraph_line(index, text_block, doc.highlights()))
            .collect()
    };

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// One paragraph, split into plain and highlighted spans.
fn paragraph_line<'a>(index: usize, text_block: &'a TextBlock, highlights: &[Highlight]) -> Line<'a> {
    let chars: Vec<(usize, char)> = text_block.text.char_indices().collect();
    let mut spans = vec![Span::styled(format!("{index:>2} "), Style::default().fg(Color::DarkGray))];

    // Per-character color, first highlight wins
    let color_at = |pos: usize| {
        highlights.iter().find(|h| h.range.from <= pos && pos < h.range.to).map(|h| h.color.as_str())
    };

    let mut run_start = 0;
    while run_start < chars.len() {
        let color = color_at(text_block.start + run_start);
        let mut run_end = run_start + 1;
        while run_end < chars.len() && color_at(text_block.start + run_end) == color {
            run_end += 1;
        }

        let from = chars[run_start].0;
        let to = chars.get(run_end).map_or(text_block.text.len(), |&(i, _)| i);
        let text = &text_block.text[from..to];
        spans.push(match color {
            Some(name) => Span::styled(text, Style::default().bg(palette_color(name)).fg(Color::Black)),
            None => Span::raw(text),
        });
        run_start = run_end;
    }

    Line::from(spans)
}
