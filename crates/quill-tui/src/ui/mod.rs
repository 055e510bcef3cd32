//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod document;
mod input;
mod status;

use quill_app::{App, TextDocument};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
};

use crate::InputState;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App, input: &InputState, doc: &TextDocument) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    render_main_area(frame, app, doc, *main_area);
    input::render(frame, app, input, *input_area);
    status::render(frame, app, *status_area);
}

/// Render the main area (document pane + chat).
fn render_main_area(frame: &mut Frame, app: &App, doc: &TextDocument, area: Rect) {
    const DOCUMENT_PERCENT: u16 = 40;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(DOCUMENT_PERCENT),
            Constraint::Min(CHAT_AREA_MIN_WIDTH),
        ])
        .split(area);

    let [document_area, chat_area] = chunks.as_ref() else {
        return;
    };

    document::render(frame, app, doc, *document_area);
    chat::render(frame, app, *chat_area);
}

/// Terminal color for a palette name.
fn palette_color(name: &str) -> Color {
    match name {
        "blue" => Color::Blue,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        "amber" => Color::Yellow,
        "rose" => Color::LightRed,
        "teal" => Color::Cyan,
        "indigo" => Color::LightBlue,
        "orange" => Color::Rgb(255, 165, 0),
        _ => Color::Gray,
    }
}
