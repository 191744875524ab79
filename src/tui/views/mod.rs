// View layer - composes components into full-screen layouts
//
// draw() is the single render entry point called by the event loop each
// frame. Overlays (logs panel, toast) render last so they sit on top.

pub mod catalog;
pub mod chat;

use crate::tui::app::{App, View};
use crate::tui::components::{logs_panel, status_bar, title_bar};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Draw the whole UI for one frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title bar
            Constraint::Min(5),    // view content
            Constraint::Length(2), // status bar
        ])
        .split(f.area());

    title_bar::render(f, chunks[0], app);

    match app.view {
        View::Catalog => catalog::render(f, chunks[1], app),
        View::Chat => chat::render(f, chunks[1], app),
    }

    status_bar::render(f, chunks[2], app);

    if app.show_logs {
        let overlay = centered_rect(80, 60, f.area());
        logs_panel::render(f, overlay, &app.log_buffer, &app.theme);
    }

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.theme);
    }
}

/// A centered rect taking the given percentage of the parent area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
