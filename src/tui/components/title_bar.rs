// Title bar component
//
// Renders the app name and, in the chat view, the open assistant with its
// typing indicator.

use crate::config::VERSION;
use crate::tui::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the title bar at the top of the screen
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let title_text = match app.view {
        View::Catalog => format!(" 💬 polychat v{} ──── choose an assistant", VERSION),
        View::Chat => match &app.session {
            Some(session) => {
                let typing = if session.is_pending() {
                    format!(" {} typing", app.spinner())
                } else {
                    String::new()
                };
                format!(
                    " 💬 polychat ──── {} {}{}",
                    session.topic.icon, session.topic.name, typing
                )
            }
            None => format!(" 💬 polychat v{}", VERSION),
        },
    };

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title)),
        );

    f.render_widget(title, area);
}
