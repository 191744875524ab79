// Catalog view - assistant browser
//
// Layout: search bar on top, category tabs below it, then the topic list.
// Each topic renders as a two-line entry: icon, name and category on the
// first line, description and feature tags on the second. The selected
// entry uses the theme's selection pair; accents come from the topic's
// color token.

use crate::catalog;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search bar
            Constraint::Length(1), // category tabs
            Constraint::Min(3),    // topic list
        ])
        .split(area);

    render_search_bar(f, chunks[0], app);
    render_category_tabs(f, chunks[1], app);
    render_topic_list(f, chunks[2], app);
}

fn render_search_bar(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let content = if app.catalog.search.is_empty() {
        Line::from(Span::styled(
            " type to search assistants...",
            Style::default().fg(theme.muted),
        ))
    } else {
        Line::from(vec![
            Span::styled(" 🔎 ", Style::default().fg(theme.muted)),
            Span::styled(
                app.catalog.search.clone(),
                Style::default().fg(theme.foreground),
            ),
            Span::styled("▏", Style::default().fg(theme.highlight)),
        ])
    };

    let bar = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(" Search "),
    );
    f.render_widget(bar, area);
}

fn render_category_tabs(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let active = app.catalog.category_label();

    let categories = catalog::categories();
    let mut spans = vec![Span::raw(" ")];
    for label in std::iter::once("All").chain(categories.iter().copied()) {
        let style = if label == active {
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.muted)
        };
        spans.push(Span::styled(format!(" {} ", label), style));
        spans.push(Span::raw(" "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_topic_list(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let topics = app.visible_topics();

    if topics.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            " no assistants match",
            Style::default().fg(theme.muted),
        )))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border))
                .title(" Assistants "),
        );
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = topics
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let accent = theme.topic_color(topic.color);
            let selected = i == app.catalog.selected;

            let marker = if selected { "▶ " } else { "  " };
            let head = Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.highlight)),
                Span::raw(format!("{} ", topic.icon)),
                Span::styled(
                    topic.name,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  ({})", topic.category),
                    Style::default().fg(theme.muted),
                ),
            ]);

            let detail = Line::from(vec![
                Span::raw("     "),
                Span::styled(topic.description, Style::default().fg(theme.foreground)),
                Span::styled(
                    format!("  [{}]", topic.features.join(" · ")),
                    Style::default().fg(theme.muted),
                ),
            ]);

            let item = ListItem::new(vec![head, detail, Line::from("")]);
            if selected {
                item.style(Style::default().bg(theme.selection))
            } else {
                item
            }
        })
        .collect();

    let title = format!(" Assistants ({}) ", topics.len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(title),
    );

    f.render_widget(list, area);
}
