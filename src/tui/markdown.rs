// Markdown parsing and rendering for the chat transcript
//
// Assistant replies follow a common lightweight dialect: headings, emphasis,
// inline code, fenced code blocks, lists, block quotes, tables, links and
// horizontal rules. pulldown-cmark parses the text into StyledSegments which
// are then converted to styled ratatui Lines with word wrapping.
//
// User messages never pass through here - they render as literal text
// (see `literal_lines`), so nothing a user types is interpreted as markup.

use crate::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

/// A segment of parsed markdown with semantic meaning
#[derive(Debug, Clone)]
pub enum StyledSegment {
    /// Regular text
    Text(String),
    /// Inline code: `like this`
    InlineCode(String),
    /// Fenced or indented code block
    CodeBlock { code: String },
    /// Soft break (single newline in source)
    SoftBreak,
    /// Hard break (explicit line break)
    HardBreak,
    /// End of paragraph (adds blank line for spacing)
    ParagraphEnd,
    /// Heading with level
    Heading { level: u8, text: String },
    /// List item marker (bullet or number)
    ListItemStart {
        ordered: bool,
        number: u32,
        depth: usize,
    },
    /// End of list item
    ListItemEnd,
    /// Bold text: **like this**
    Bold(String),
    /// Italic text: *like this*
    Italic(String),
    /// Start of blockquote (> prefix)
    BlockQuoteStart,
    /// End of blockquote
    BlockQuoteEnd,
    /// Horizontal rule (---)
    Rule,
    /// Link: [text](url)
    Link { text: String, url: String },
    /// Table header row
    TableHead(Vec<String>),
    /// Table body row
    TableRow(Vec<String>),
    /// Table end
    TableEnd,
}

/// Parse markdown into styled segments
pub fn parse_markdown(markdown: &str) -> Vec<StyledSegment> {
    let mut segments = Vec::new();

    let mut in_code_block = false;
    let mut code_block_content = String::new();
    let mut in_heading: Option<u8> = None;
    let mut heading_content = String::new();

    // List tracking: stack of (ordered, next_number) for nested lists
    let mut list_stack: Vec<(bool, u32)> = Vec::new();

    // Inline formatting state
    let mut in_bold = false;
    let mut in_italic = false;
    let mut bold_content = String::new();
    let mut italic_content = String::new();

    // Link state
    let mut in_link = false;
    let mut link_url = String::new();
    let mut link_text = String::new();

    // Table state
    let mut in_table = false;
    let mut in_table_head = false;
    let mut current_row: Vec<String> = Vec::new();
    let mut current_cell = String::new();

    for event in Parser::new_ext(markdown, Options::ENABLE_TABLES) {
        match event {
            Event::Code(code) => {
                if in_heading.is_some() {
                    heading_content.push_str(&code);
                } else if in_table {
                    current_cell.push_str(&code);
                } else {
                    segments.push(StyledSegment::InlineCode(code.to_string()));
                }
            }

            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = Some(match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    HeadingLevel::H4 => 4,
                    HeadingLevel::H5 => 5,
                    HeadingLevel::H6 => 6,
                });
                heading_content.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(level) = in_heading.take() {
                    segments.push(StyledSegment::Heading {
                        level,
                        text: heading_content.clone(),
                    });
                }
                heading_content.clear();
            }

            Event::Start(Tag::CodeBlock(_kind)) => {
                in_code_block = true;
                code_block_content.clear();
            }
            Event::Text(text) if in_code_block => {
                code_block_content.push_str(&text);
            }
            Event::End(TagEnd::CodeBlock) => {
                segments.push(StyledSegment::CodeBlock {
                    code: code_block_content.clone(),
                });
                in_code_block = false;
                code_block_content.clear();
            }

            Event::Text(text) if in_heading.is_some() => heading_content.push_str(&text),
            Event::Text(text) if in_link => link_text.push_str(&text),
            Event::Text(text) if in_bold => bold_content.push_str(&text),
            Event::Text(text) if in_italic => italic_content.push_str(&text),
            Event::Text(text) if in_table => current_cell.push_str(&text),
            Event::Text(text) => segments.push(StyledSegment::Text(text.to_string())),

            Event::End(TagEnd::Paragraph) => segments.push(StyledSegment::ParagraphEnd),

            Event::SoftBreak => {
                if in_heading.is_some() {
                    heading_content.push(' ');
                } else {
                    segments.push(StyledSegment::SoftBreak);
                }
            }
            Event::HardBreak => segments.push(StyledSegment::HardBreak),

            Event::Start(Tag::List(first_number)) => {
                let ordered = first_number.is_some();
                let start = first_number.unwrap_or(1) as u32;
                list_stack.push((ordered, start));
            }
            Event::End(TagEnd::List(_)) => {
                list_stack.pop();
                if list_stack.is_empty() {
                    segments.push(StyledSegment::ParagraphEnd);
                }
            }
            Event::Start(Tag::Item) => {
                let depth = list_stack.len();
                if let Some((ordered, ref mut number)) = list_stack.last_mut() {
                    segments.push(StyledSegment::ListItemStart {
                        ordered: *ordered,
                        number: *number,
                        depth,
                    });
                    *number += 1;
                }
            }
            Event::End(TagEnd::Item) => segments.push(StyledSegment::ListItemEnd),

            Event::Start(Tag::Strong) => {
                in_bold = true;
                bold_content.clear();
            }
            Event::End(TagEnd::Strong) => {
                if !bold_content.is_empty() {
                    segments.push(StyledSegment::Bold(bold_content.clone()));
                }
                bold_content.clear();
                in_bold = false;
            }

            Event::Start(Tag::Emphasis) => {
                in_italic = true;
                italic_content.clear();
            }
            Event::End(TagEnd::Emphasis) => {
                if !italic_content.is_empty() {
                    segments.push(StyledSegment::Italic(italic_content.clone()));
                }
                italic_content.clear();
                in_italic = false;
            }

            Event::Start(Tag::BlockQuote) => segments.push(StyledSegment::BlockQuoteStart),
            Event::End(TagEnd::BlockQuote) => segments.push(StyledSegment::BlockQuoteEnd),

            Event::Rule => segments.push(StyledSegment::Rule),

            Event::Start(Tag::Link { dest_url, .. }) => {
                in_link = true;
                link_url = dest_url.to_string();
                link_text.clear();
            }
            Event::End(TagEnd::Link) => {
                segments.push(StyledSegment::Link {
                    text: link_text.clone(),
                    url: link_url.clone(),
                });
                link_text.clear();
                link_url.clear();
                in_link = false;
            }

            Event::Start(Tag::Table(_)) => {
                in_table = true;
            }
            Event::End(TagEnd::Table) => {
                segments.push(StyledSegment::TableEnd);
                in_table = false;
            }
            Event::Start(Tag::TableHead) => {
                in_table_head = true;
                current_row.clear();
            }
            Event::End(TagEnd::TableHead) => {
                segments.push(StyledSegment::TableHead(current_row.clone()));
                current_row.clear();
                in_table_head = false;
            }
            Event::Start(Tag::TableRow) => current_row.clear(),
            Event::End(TagEnd::TableRow) => {
                if !in_table_head {
                    segments.push(StyledSegment::TableRow(current_row.clone()));
                }
                current_row.clear();
            }
            Event::Start(Tag::TableCell) => current_cell.clear(),
            Event::End(TagEnd::TableCell) => {
                current_row.push(current_cell.clone());
                current_cell.clear();
            }

            _ => {}
        }
    }

    segments
}

/// Wrap text to fit within width, breaking at word boundaries
///
/// Preserves leading/trailing whitespace so spacing between adjacent inline
/// segments survives wrapping. Uses unicode display width for emojis/CJK.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let leading_space = text.starts_with(char::is_whitespace);
    let trailing_space = text.ends_with(char::is_whitespace);

    let mut result = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0usize;

    if leading_space {
        current_line.push(' ');
        current_width = 1;
    }

    for word in text.split_whitespace() {
        let word_width = word.width();
        if current_line.is_empty() || (current_width == 1 && leading_space && result.is_empty()) {
            current_line.push_str(word);
            current_width += word_width;
        } else if current_width + 1 + word_width <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            result.push(current_line);
            current_line = word.to_string();
            current_width = word_width;
        }
    }

    if trailing_space && !current_line.is_empty() {
        current_line.push(' ');
    }
    if !current_line.is_empty() {
        result.push(current_line);
    }

    // Whitespace-only input
    if result.is_empty() && !text.is_empty() {
        result.push(text.to_string());
    }

    result
}

/// Convert parsed segments to ratatui Lines
///
/// `accent` is the topic's resolved accent color: headings, list markers and
/// quote bars pick it up so each assistant keeps its visual identity.
pub fn segments_to_lines(
    segments: &[StyledSegment],
    width: usize,
    theme: &Theme,
    accent: Color,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut current_width: usize = 0;

    let flush_line = |lines: &mut Vec<Line<'static>>, spans: &mut Vec<Span<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    for segment in segments {
        match segment {
            StyledSegment::Text(text) => {
                let parts: Vec<&str> = text.split('\n').collect();
                for (i, part) in parts.iter().enumerate() {
                    if !part.is_empty() {
                        let wrapped = wrap_text(part, width);
                        for (j, wrapped_line) in wrapped.iter().enumerate() {
                            let line_width = wrapped_line.width();
                            let needs_new_line =
                                current_width > 0 && current_width + line_width > width;
                            if j > 0 || needs_new_line {
                                flush_line(&mut lines, &mut current_spans);
                                current_width = 0;
                            }
                            current_spans.push(Span::raw(wrapped_line.clone()));
                            current_width += line_width;
                        }
                    }
                    if i < parts.len() - 1 {
                        flush_line(&mut lines, &mut current_spans);
                        current_width = 0;
                    }
                }
            }

            StyledSegment::InlineCode(code) => {
                current_spans.push(Span::styled(
                    code.clone(),
                    Style::default().fg(theme.code_inline),
                ));
                current_width += code.width();
            }

            StyledSegment::CodeBlock { code } => {
                flush_line(&mut lines, &mut current_spans);
                current_width = 0;
                for line in code.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", line),
                        Style::default()
                            .fg(theme.code_block)
                            .add_modifier(Modifier::DIM),
                    )));
                }
            }

            StyledSegment::SoftBreak => {
                current_spans.push(Span::raw(" "));
                current_width += 1;
            }

            StyledSegment::HardBreak => {
                flush_line(&mut lines, &mut current_spans);
                current_width = 0;
            }

            StyledSegment::ParagraphEnd => {
                flush_line(&mut lines, &mut current_spans);
                lines.push(Line::from(""));
                current_width = 0;
            }

            StyledSegment::Heading { level, text } => {
                flush_line(&mut lines, &mut current_spans);
                current_width = 0;
                // H1/H2 carry the topic accent; deeper levels stay bold-only
                let style = match level {
                    1 | 2 => Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    _ => Style::default().add_modifier(Modifier::BOLD),
                };
                lines.push(Line::from(Span::styled(text.clone(), style)));
            }

            StyledSegment::ListItemStart {
                ordered,
                number,
                depth,
            } => {
                flush_line(&mut lines, &mut current_spans);
                let indent = "  ".repeat(depth.saturating_sub(1));
                let marker = if *ordered {
                    format!("{}{}. ", indent, number)
                } else {
                    format!("{}• ", indent)
                };
                current_width = marker.width();
                current_spans.push(Span::styled(marker, Style::default().fg(accent)));
            }

            StyledSegment::ListItemEnd => {
                flush_line(&mut lines, &mut current_spans);
                current_width = 0;
            }

            StyledSegment::Bold(text) => {
                current_spans.push(Span::styled(
                    text.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                current_width += text.width();
            }

            StyledSegment::Italic(text) => {
                current_spans.push(Span::styled(
                    text.clone(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ));
                current_width += text.width();
            }

            StyledSegment::BlockQuoteStart => {
                flush_line(&mut lines, &mut current_spans);
                current_spans.push(Span::styled("│ ".to_string(), Style::default().fg(accent)));
                current_width = 2;
            }

            StyledSegment::BlockQuoteEnd => {
                flush_line(&mut lines, &mut current_spans);
                lines.push(Line::from(""));
                current_width = 0;
            }

            StyledSegment::Rule => {
                flush_line(&mut lines, &mut current_spans);
                let rule_width = width.saturating_sub(4).max(10);
                lines.push(Line::from(Span::styled(
                    "─".repeat(rule_width),
                    Style::default().fg(theme.border),
                )));
                current_width = 0;
            }

            StyledSegment::Link { text, url } => {
                let display = if text.is_empty() || text == url {
                    url.clone()
                } else {
                    format!("{} ({})", text, url)
                };
                current_spans.push(Span::styled(
                    display.clone(),
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::UNDERLINED),
                ));
                current_width += display.width();
            }

            StyledSegment::TableHead(cells) => {
                flush_line(&mut lines, &mut current_spans);
                current_width = 0;
                lines.extend(render_table_row(cells, theme, accent, true));
            }

            StyledSegment::TableRow(cells) => {
                lines.extend(render_table_row(cells, theme, accent, false));
            }

            StyledSegment::TableEnd => {
                lines.push(Line::from(""));
                current_width = 0;
            }
        }
    }

    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }

    lines
}

/// Render a table row with box-drawing characters
fn render_table_row(
    cells: &[String],
    theme: &Theme,
    accent: Color,
    is_header: bool,
) -> Vec<Line<'static>> {
    let mut result = Vec::new();
    let col_widths: Vec<usize> = cells.iter().map(|c| c.width().max(3)).collect();

    let mut spans: Vec<Span<'static>> = Vec::new();
    spans.push(Span::styled(
        "│ ".to_string(),
        Style::default().fg(theme.border),
    ));
    for (i, cell) in cells.iter().enumerate() {
        let width = col_widths.get(i).copied().unwrap_or(3);
        let pad = width.saturating_sub(cell.width());
        let padded = format!("{}{}", cell, " ".repeat(pad));
        let style = if is_header {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        spans.push(Span::styled(padded, style));
        spans.push(Span::styled(
            " │ ".to_string(),
            Style::default().fg(theme.border),
        ));
    }
    result.push(Line::from(spans));

    if is_header {
        let mut sep = String::from("├─");
        for (i, &width) in col_widths.iter().enumerate() {
            sep.push_str(&"─".repeat(width));
            if i < col_widths.len() - 1 {
                sep.push_str("─┼─");
            }
        }
        sep.push_str("─┤");
        result.push(Line::from(Span::styled(
            sep,
            Style::default().fg(theme.border),
        )));
    }

    result
}

/// Strip control characters that can cause TUI rendering artifacts
///
/// Removes carriage returns, backspaces, ANSI escape sequences and other
/// control characters (except tab and newline).
fn sanitize_for_tui(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\x1b' => {
                // ANSI sequences: ESC [ <params> <letter>
                if chars.peek() == Some(&'[') {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        chars.next();
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\r' | '\x08' | '\x7f' => {}
            c if c.is_ascii_control() && c != '\t' && c != '\n' => {}
            _ => result.push(ch),
        }
    }

    result
}

/// High-level: parse markdown and convert directly to Lines
pub fn render_markdown(
    markdown: &str,
    width: usize,
    theme: &Theme,
    accent: Color,
) -> Vec<Line<'static>> {
    let sanitized = sanitize_for_tui(markdown);
    let segments = parse_markdown(&sanitized);
    segments_to_lines(&segments, width, theme, accent)
}

/// Render user-authored text as literal lines - never parsed as markup
pub fn literal_lines(text: &str, width: usize, style: Style) -> Vec<Line<'static>> {
    let sanitized = sanitize_for_tui(text);
    let mut lines = Vec::new();
    for raw_line in sanitized.split('\n') {
        if raw_line.is_empty() {
            lines.push(Line::from(""));
            continue;
        }
        for wrapped in wrap_text(raw_line, width) {
            lines.push(Line::from(Span::styled(wrapped, style)));
        }
    }
    lines
}

/// Best-effort plain-text transform for clipboard copy
///
/// Strips markup markers (bold/italic/code markers, heading hashes, quote
/// prefixes) and converts list bullets to plain dashes. Lossy by design -
/// layout niceties like table alignment are reduced to tab-separated text.
pub fn plain_text(markdown: &str) -> String {
    let mut out = String::new();

    let end_block = |out: &mut String| {
        while out.ends_with(' ') {
            out.pop();
        }
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
    };

    for segment in parse_markdown(markdown) {
        match segment {
            StyledSegment::Text(t) => out.push_str(&t),
            StyledSegment::InlineCode(c) => out.push_str(&c),
            StyledSegment::Bold(t) | StyledSegment::Italic(t) => out.push_str(&t),
            StyledSegment::Heading { text, .. } => {
                end_block(&mut out);
                out.push_str(&text);
                out.push('\n');
            }
            StyledSegment::CodeBlock { code } => {
                end_block(&mut out);
                out.push_str(&code);
                if !code.ends_with('\n') {
                    out.push('\n');
                }
            }
            StyledSegment::SoftBreak => out.push(' '),
            StyledSegment::HardBreak => out.push('\n'),
            StyledSegment::ParagraphEnd => {
                end_block(&mut out);
                out.push('\n');
            }
            StyledSegment::ListItemStart {
                ordered,
                number,
                depth,
            } => {
                end_block(&mut out);
                out.push_str(&"  ".repeat(depth.saturating_sub(1)));
                if ordered {
                    out.push_str(&format!("{}. ", number));
                } else {
                    out.push_str("- ");
                }
            }
            StyledSegment::ListItemEnd => end_block(&mut out),
            StyledSegment::BlockQuoteStart | StyledSegment::BlockQuoteEnd => end_block(&mut out),
            StyledSegment::Rule => end_block(&mut out),
            StyledSegment::Link { text, url } => {
                if text.is_empty() {
                    out.push_str(&url);
                } else {
                    out.push_str(&text);
                }
            }
            StyledSegment::TableHead(cells) | StyledSegment::TableRow(cells) => {
                end_block(&mut out);
                out.push_str(&cells.join("\t"));
                out.push('\n');
            }
            StyledSegment::TableEnd => end_block(&mut out),
        }
    }

    // Collapse runs of blank lines left by block spacing
    let mut collapsed = String::with_capacity(out.len());
    let mut blank_run = 0;
    for line in out.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        collapsed.push_str(line.trim_end());
        collapsed.push('\n');
    }

    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inline_code() {
        let segments = parse_markdown("Check the `config.toml` file");
        assert!(matches!(segments[0], StyledSegment::Text(_)));
        assert!(matches!(segments[1], StyledSegment::InlineCode(_)));
        assert!(matches!(segments[2], StyledSegment::Text(_)));
    }

    #[test]
    fn parse_heading_levels() {
        let segments = parse_markdown("# Top\n\n### Deep");
        let headings: Vec<u8> = segments
            .iter()
            .filter_map(|s| match s {
                StyledSegment::Heading { level, .. } => Some(*level),
                _ => None,
            })
            .collect();
        assert_eq!(headings, vec![1, 3]);
    }

    #[test]
    fn parse_ordered_list_numbers() {
        let segments = parse_markdown("1. first\n2. second\n");
        let numbers: Vec<u32> = segments
            .iter()
            .filter_map(|s| match s {
                StyledSegment::ListItemStart { number, .. } => Some(*number),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn wrap_respects_width() {
        let wrapped = wrap_text("one two three four five", 9);
        assert!(wrapped.iter().all(|l| l.width() <= 9));
        assert_eq!(wrapped.join(" "), "one two three four five");
    }

    #[test]
    fn sanitize_strips_ansi_and_cr() {
        let dirty = "normal\x1b[31mred\x1b[0m\rtail";
        assert_eq!(sanitize_for_tui(dirty), "normalredtail");
    }

    #[test]
    fn render_produces_lines_for_mixed_content() {
        let theme = Theme::default();
        let lines = render_markdown(
            "# Title\n\nSome **bold** text\n\n- item one\n- item two\n",
            40,
            &theme,
            Color::Blue,
        );
        assert!(!lines.is_empty());
    }

    #[test]
    fn literal_lines_do_not_interpret_markup() {
        let lines = literal_lines("**not bold**", 40, Style::default());
        assert_eq!(lines.len(), 1);
        // Markers survive verbatim
        assert_eq!(lines[0].spans[0].content, "**not bold**");
    }

    #[test]
    fn plain_text_strips_markers_and_keeps_content() {
        let input = "# heading\n\nThis is **bold**, *soft*, and `code`.\n";
        let plain = plain_text(input);

        for marker in ['#', '*', '`'] {
            assert!(!plain.contains(marker), "residual {:?} in {:?}", marker, plain);
        }
        assert!(plain.contains("heading"));
        assert!(plain.contains("This is bold, soft, and code."));
    }

    #[test]
    fn plain_text_converts_bullets_and_quotes() {
        let input = "> quoted wisdom\n\n- alpha\n- beta\n\n1. one\n2. two\n";
        let plain = plain_text(input);

        assert!(!plain.contains('>'));
        assert!(plain.contains("quoted wisdom"));
        assert!(plain.contains("- alpha"));
        assert!(plain.contains("- beta"));
        assert!(plain.contains("1. one"));
        assert!(plain.contains("2. two"));
    }

    #[test]
    fn plain_text_preserves_code_block_contents() {
        let input = "```rust\nlet x = 1;\n```\n";
        let plain = plain_text(input);
        assert!(plain.contains("let x = 1;"));
        assert!(!plain.contains("```"));
    }
}
