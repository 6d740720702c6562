//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

use crate::core::context::ThemeMode;

/// Central theme — one palette per mode, change colours here and they
/// propagate everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    highlight_bg: Color,
    chrome_bg: Color,
    chrome_fg: Color,
    serif: bool,
}

impl Theme {
    pub fn new(mode: ThemeMode, serif: bool) -> Self {
        match mode {
            ThemeMode::Light => Self {
                background: Color::Rgb(250, 248, 242),
                text: Color::Rgb(40, 40, 40),
                muted: Color::Rgb(140, 140, 140),
                accent: Color::Rgb(150, 75, 0),
                highlight_bg: Color::Rgb(238, 232, 213),
                chrome_bg: Color::Rgb(225, 220, 205),
                chrome_fg: Color::Rgb(60, 60, 60),
                serif,
            },
            ThemeMode::Dark => Self {
                background: Color::Rgb(24, 24, 27),
                text: Color::Rgb(220, 220, 215),
                muted: Color::Rgb(120, 120, 125),
                accent: Color::Rgb(230, 180, 90),
                highlight_bg: Color::Rgb(45, 45, 52),
                chrome_bg: Color::Rgb(38, 38, 42),
                chrome_fg: Color::Rgb(200, 200, 200),
                serif,
            },
        }
    }

    // ── reading column ─────────────────────────────────────────
    pub fn page_style(&self) -> Style {
        Style::default().bg(self.background).fg(self.text)
    }

    /// Verse body.  The serif preference renders as an italic face.
    pub fn verse_style(&self) -> Style {
        let style = self.page_style();
        if self.serif {
            style.add_modifier(Modifier::ITALIC)
        } else {
            style
        }
    }

    pub fn verse_number_style(&self) -> Style {
        self.page_style().fg(self.muted)
    }

    pub fn heading_style(&self) -> Style {
        self.page_style()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Applied on top of the unit under the cursor.
    pub fn cursor_style(&self) -> Style {
        Style::default().bg(self.highlight_bg)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn header_style(&self) -> Style {
        Style::default().bg(self.chrome_bg).fg(self.chrome_fg)
    }

    pub fn selector_style(&self) -> Style {
        self.header_style()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default().bg(self.chrome_bg).fg(self.chrome_fg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    // ── popups ─────────────────────────────────────────────────
    pub fn popup_style(&self) -> Style {
        Style::default().bg(self.background).fg(self.text)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .fg(self.text)
            .add_modifier(Modifier::BOLD)
    }

    pub fn on_style(&self) -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn input_style(&self) -> Style {
        Style::default().fg(self.accent)
    }
}
