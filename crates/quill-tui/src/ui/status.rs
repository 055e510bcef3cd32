//! Status bar
//!
//! Displays connection status, model, agent flag and the latest notice.

use quill_app::{App, ConnectionState};
use quill_core::DEFAULT_MAX_RECONNECT_ATTEMPTS;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let connection_status = match app.connection_state() {
        ConnectionState::Disconnected { retry_pending: true, reconnect_attempts, .. } => {
            Span::styled(
                format!("Reconnecting ({reconnect_attempts}/{DEFAULT_MAX_RECONNECT_ATTEMPTS})"),
                Style::default().fg(Color::Yellow),
            )
        },
        ConnectionState::Disconnected { .. } => {
            Span::styled("Disconnected", Style::default().fg(Color::Red))
        },
        ConnectionState::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        },
        ConnectionState::Connected => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let mode = if app.is_agent() { "agent" } else { "chat" };
    let info = format!(" | {} | {mode}", app.selected_model().tag());
    let notice = app.status_message().map(|m| format!(" | {m}")).unwrap_or_default();

    let status_line = Line::from(vec![
        Span::raw(" "),
        connection_status,
        Span::raw(info),
        Span::styled(notice, Style::default().add_modifier(Modifier::ITALIC)),
    ]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
