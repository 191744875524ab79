// Theme system for the TUI
//
// Two built-in palettes (dark, light) with semantic colors. Topic accent
// colors are resolved here from the catalog's ColorToken so the catalog
// stays free of terminal concerns.

use crate::catalog::ColorToken;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

/// Resolved theme ready for use in the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,

    // Terminal colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Chrome
    pub border: Color,
    pub highlight: Color,
    pub title: Color,
    pub status_bar: Color,
    pub selection: Color,
    pub selection_fg: Color,
    pub border_type: BorderType,

    // Transcript
    pub user_message: Color,
    pub error: Color,
    pub ok: Color,
    pub warn: Color,

    // Markdown
    pub code_inline: Color,
    pub code_block: Color,

    dark_accents: bool,
}

impl Theme {
    /// Load a theme by name; unknown names fall back to dark
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::Rgb(18, 18, 24),
            foreground: Color::Rgb(220, 220, 228),
            muted: Color::Rgb(120, 120, 135),
            border: Color::Rgb(70, 70, 90),
            highlight: Color::Rgb(130, 170, 255),
            title: Color::Rgb(200, 210, 255),
            status_bar: Color::Rgb(150, 150, 170),
            selection: Color::Rgb(50, 56, 80),
            selection_fg: Color::Rgb(235, 235, 245),
            border_type: BorderType::Rounded,
            user_message: Color::Rgb(130, 170, 255),
            error: Color::Rgb(240, 110, 110),
            ok: Color::Rgb(120, 200, 140),
            warn: Color::Rgb(230, 190, 100),
            code_inline: Color::Rgb(230, 180, 120),
            code_block: Color::Rgb(170, 180, 200),
            dark_accents: false,
        }
    }

    fn light() -> Self {
        Self {
            name: "light",
            background: Color::Rgb(248, 248, 250),
            foreground: Color::Rgb(40, 40, 50),
            muted: Color::Rgb(130, 130, 145),
            border: Color::Rgb(190, 190, 205),
            highlight: Color::Rgb(50, 90, 200),
            title: Color::Rgb(40, 60, 140),
            status_bar: Color::Rgb(100, 100, 120),
            selection: Color::Rgb(210, 220, 245),
            selection_fg: Color::Rgb(20, 20, 30),
            border_type: BorderType::Rounded,
            user_message: Color::Rgb(50, 90, 200),
            error: Color::Rgb(190, 50, 50),
            ok: Color::Rgb(30, 140, 70),
            warn: Color::Rgb(180, 130, 20),
            code_inline: Color::Rgb(160, 90, 20),
            code_block: Color::Rgb(80, 90, 110),
            dark_accents: true,
        }
    }

    /// Resolve a topic accent token to a concrete color
    pub fn topic_color(&self, token: ColorToken) -> Color {
        if self.dark_accents {
            // Darker accent variants keep contrast on a light background
            match token {
                ColorToken::Red => Color::Rgb(200, 55, 55),
                ColorToken::Violet => Color::Rgb(120, 60, 190),
                ColorToken::Blue => Color::Rgb(40, 90, 200),
                ColorToken::Green => Color::Rgb(25, 135, 85),
                ColorToken::Amber => Color::Rgb(180, 125, 10),
                ColorToken::Indigo => Color::Rgb(80, 80, 200),
                ColorToken::Pink => Color::Rgb(200, 50, 130),
                ColorToken::Orange => Color::Rgb(210, 100, 30),
                ColorToken::Slate => Color::Rgb(90, 100, 115),
            }
        } else {
            match token {
                ColorToken::Red => Color::Rgb(239, 68, 68),
                ColorToken::Violet => Color::Rgb(139, 92, 246),
                ColorToken::Blue => Color::Rgb(59, 130, 246),
                ColorToken::Green => Color::Rgb(16, 185, 129),
                ColorToken::Amber => Color::Rgb(245, 158, 11),
                ColorToken::Indigo => Color::Rgb(99, 102, 241),
                ColorToken::Pink => Color::Rgb(236, 72, 153),
                ColorToken::Orange => Color::Rgb(249, 115, 22),
                ColorToken::Slate => Color::Rgb(148, 163, 184),
            }
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::by_name("solarized").name, "dark");
        assert_eq!(Theme::by_name("light").name, "light");
    }

    #[test]
    fn accents_differ_between_palettes() {
        let dark = Theme::by_name("dark");
        let light = Theme::by_name("light");
        assert_ne!(
            dark.topic_color(ColorToken::Red),
            light.topic_color(ColorToken::Red)
        );
    }
}
