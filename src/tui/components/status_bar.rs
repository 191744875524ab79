// Status bar component
//
// Bottom line: connectivity indicator on the left, key hints for the
// current view on the right.

use crate::connectivity::ServerStatus;
use crate::tui::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the status bar with connectivity and key hints
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let status = app.connectivity.server;
    let status_color = match status {
        ServerStatus::Online => app.theme.ok,
        ServerStatus::Degraded => app.theme.warn,
        ServerStatus::Offline => app.theme.error,
        ServerStatus::Unknown => app.theme.muted,
    };

    let hints = match app.view {
        View::Catalog => "type:search  ↑↓:select  Tab:category  Enter:open  F12:logs  Esc:quit",
        View::Chat => {
            "Enter:send  ^L:clear  ^Y:copy reply  ^R:recheck  ↑↓:scroll  Esc:back"
        }
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" ● {}", status.label()),
            Style::default()
                .fg(status_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" │ {}", hints),
            Style::default().fg(app.theme.status_bar),
        ),
    ]);

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::TOP));
    f.render_widget(bar, area);
}
