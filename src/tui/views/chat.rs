// Chat view - transcript, error banner, input box
//
// The transcript pre-renders every message into wrapped Lines at the
// current width, then shows a window of them driven by the scroll offset
// (0 = pinned to the bottom). Assistant messages go through the markdown
// renderer with the topic's accent; user messages render literally so
// nothing the user typed is mistaken for markup.

use crate::session::Role;
use crate::tui::app::App;
use crate::tui::markdown;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let has_error = app
        .session
        .as_ref()
        .is_some_and(|s| s.last_error().is_some());

    let constraints = if has_error {
        vec![
            Constraint::Min(3),    // transcript
            Constraint::Length(3), // error banner
            Constraint::Length(3), // input
        ]
    } else {
        vec![Constraint::Min(3), Constraint::Length(3)]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    render_transcript(f, chunks[0], app);
    if has_error {
        render_error_banner(f, chunks[1], app);
        render_input(f, chunks[2], app);
    } else {
        render_input(f, chunks[1], app);
    }
}

fn render_transcript(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(session) = &app.session else {
        return;
    };
    let accent = theme.topic_color(session.topic.color);

    // Inner width after borders and a one-cell gutter
    let width = area.width.saturating_sub(4).max(20) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for message in session.messages() {
        match message.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You",
                    Style::default()
                        .fg(theme.user_message)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.extend(markdown::literal_lines(
                    &message.text,
                    width,
                    Style::default().fg(theme.foreground),
                ));
            }
            Role::Assistant => {
                let mut header = vec![Span::styled(
                    session.topic.name,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )];
                if let Some(latency) = message.latency_seconds {
                    header.push(Span::styled(
                        format!(" · {:.1}s", latency),
                        Style::default().fg(theme.muted),
                    ));
                }
                lines.push(Line::from(header));
                lines.extend(markdown::render_markdown(&message.text, width, theme, accent));
            }
        }
        lines.push(Line::from(""));
    }

    if session.is_pending() {
        lines.push(Line::from(Span::styled(
            format!("{} {} is typing...", app.spinner(), session.topic.name),
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Window the lines by the scroll offset, pinned to the bottom at 0
    let viewport = area.height.saturating_sub(2) as usize;
    let max_offset = lines.len().saturating_sub(viewport);
    let offset = app.scroll_from_bottom.min(max_offset);
    let start = max_offset - offset;
    let visible: Vec<Line> = lines.into_iter().skip(start).take(viewport).collect();

    let scroll_marker = if offset > 0 {
        format!(" Conversation [↑{}] ", offset)
    } else {
        " Conversation ".to_string()
    };

    let transcript = Paragraph::new(visible).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(scroll_marker),
    );
    f.render_widget(transcript, area);
}

fn render_error_banner(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(error) = app.session.as_ref().and_then(|s| s.last_error()) else {
        return;
    };

    let banner = Paragraph::new(Line::from(vec![
        Span::styled(
            "⚠ ",
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ),
        Span::styled(error.to_string(), Style::default().fg(theme.error)),
        Span::styled("  (Esc to dismiss)", Style::default().fg(theme.muted)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.error)),
    );
    f.render_widget(banner, area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let pending = app.session.as_ref().is_some_and(|s| s.is_pending());

    let content = if app.input.is_empty() {
        let hint = if pending {
            " waiting for a reply..."
        } else {
            " type a message and press Enter"
        };
        Line::from(Span::styled(hint, Style::default().fg(theme.muted)))
    } else {
        // Show the tail when the input outgrows the box
        let visible_width = area.width.saturating_sub(4) as usize;
        let tail: String = app
            .input
            .chars()
            .rev()
            .take(visible_width)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        Line::from(vec![
            Span::styled(tail, Style::default().fg(theme.foreground)),
            Span::styled("▏", Style::default().fg(theme.highlight)),
        ])
    };

    // Character budget only shown once it starts to matter
    let count = app.input_char_count();
    let limit = app.max_message_len();
    let title = if count * 10 >= limit * 9 {
        format!(" Message ({}/{}) ", count, limit)
    } else {
        " Message ".to_string()
    };

    let border_color = if pending { theme.muted } else { theme.highlight };
    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border_color))
            .title(title),
    );
    f.render_widget(input, area);
}
