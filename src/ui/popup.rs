//! Popup overlay widgets: settings, help, quick jump, book/chapter pickers
//! and the continue-reading prompt.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use crate::app::settings::{SettingsItem, SETTINGS_ITEMS};
use crate::app::state::{AppState, JumpState, PickerState};
use crate::config::{Action, AppConfig};

use super::theme::Theme;

/// Visible list rows in the book and chapter pickers.
pub const PICKER_ROWS: usize = 12;

const JUMP_HINT: &str = "Type to search (e.g., \"John 3:16\" or \"Psalm 23\")";
const NO_MATCHES: &str = "No matches found";

/// Clear `popup` and draw a titled, rounded frame around it.  Returns the
/// inner area.
fn frame(title: &str, popup: Rect, theme: &Theme, buf: &mut Buffer) -> Rect {
    Clear.render(popup, buf);
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme.border_style())
        .style(theme.popup_style());
    let inner = block.inner(popup);
    block.render(popup, buf);
    inner
}

fn row(selected: bool, text: String, theme: &Theme) -> Line<'static> {
    if selected {
        Line::from(Span::styled(format!(" ▸ {text}"), theme.selected_style()))
    } else {
        Line::from(Span::styled(format!("   {text}"), theme.popup_style()))
    }
}

// ───────────────────────────────────────── settings popup ────

pub struct SettingsPopup<'a> {
    pub state: &'a AppState,
    pub theme: Theme,
}

impl Widget for SettingsPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (SETTINGS_ITEMS.len() as u16) + 5;
        let popup = centered_fixed(44, height, area);
        let inner = frame("Settings", popup, &self.theme, buf);

        let mut lines = vec![Line::raw("")];
        for (i, item) in SETTINGS_ITEMS.iter().enumerate() {
            let selected = i == self.state.settings_selected;
            let (value, value_style) = match item {
                SettingsItem::Toggle { get, .. } => {
                    if get(self.state) {
                        ("[ON]".to_string(), self.theme.on_style())
                    } else {
                        ("[OFF]".to_string(), self.theme.dim_style())
                    }
                }
                SettingsItem::Cycle { value, .. } => (value(self.state), self.theme.on_style()),
            };
            let mut line = row(selected, format!("{:<18}", item.label()), &self.theme);
            line.spans.push(Span::styled(format!(" {value}"), value_style));
            lines.push(line);
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Enter/Space: change  Esc: close",
            self.theme.dim_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── help popup ────────

/// Key bindings for every action.
pub struct HelpPopup<'a> {
    pub config: &'a AppConfig,
    pub theme: Theme,
}

impl Widget for HelpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (Action::ALL.len() as u16) + 6;
        let popup = centered_fixed(52, height, area);
        let inner = frame("Keys", popup, &self.theme, buf);

        let mut lines = vec![Line::raw("")];
        for &action in Action::ALL {
            let label_col = format!("   {:<22}", action.label());
            let keys_width = (inner.width as usize).saturating_sub(label_col.len()).max(1);
            let keys = self.config.display_bindings(action);
            lines.push(Line::from(vec![
                Span::styled(label_col, self.theme.popup_style()),
                Span::styled(format!("{keys:>keys_width$}"), self.theme.on_style()),
            ]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  Wheel: scroll  Click: centre  Drag: chapter",
            self.theme.dim_style(),
        )));
        lines.push(Line::from(Span::styled("  Esc: close", self.theme.dim_style())));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── quick jump ────────

pub struct JumpPopup<'a> {
    pub jump: &'a JumpState,
    pub theme: Theme,
}

impl Widget for JumpPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let height = (self.jump.suggestions.len().max(1) as u16) + 6;
        let popup = centered_fixed(56, height, area);
        let inner = frame("Jump to", popup, &self.theme, buf);

        let mut lines = vec![
            Line::from(vec![
                Span::styled(" > ", self.theme.dim_style()),
                Span::styled(format!("{}_", self.jump.query), self.theme.input_style()),
            ]),
            Line::raw(""),
        ];
        if self.jump.query.trim().is_empty() {
            lines.push(Line::from(Span::styled(format!("   {JUMP_HINT}"), self.theme.dim_style())));
        } else if self.jump.suggestions.is_empty() {
            lines.push(Line::from(Span::styled(format!("   {NO_MATCHES}"), self.theme.dim_style())));
        } else {
            for (i, suggestion) in self.jump.suggestions.iter().enumerate() {
                lines.push(row(i == self.jump.selected, suggestion.display.clone(), &self.theme));
            }
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            "  ↑/↓: choose  Enter: go  Esc: close",
            self.theme.dim_style(),
        )));

        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── pickers ───────────

/// Scrolling list used by the book and chapter selectors.
pub struct PickerPopup<'a> {
    pub title: &'a str,
    pub items: Vec<String>,
    pub picker: &'a PickerState,
    pub theme: Theme,
}

impl Widget for PickerPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = self.items.len().clamp(1, PICKER_ROWS);
        let popup = centered_fixed(36, visible as u16 + 4, area);
        let inner = frame(self.title, popup, &self.theme, buf);

        let mut lines = vec![Line::raw("")];
        for (i, item) in self
            .items
            .into_iter()
            .enumerate()
            .skip(self.picker.offset)
            .take(PICKER_ROWS)
        {
            lines.push(row(i == self.picker.selected, item, &self.theme));
        }
        Paragraph::new(lines).render(inner, buf);
    }
}

// ───────────────────────────────────────── continue ──────────

pub struct ContinuePopup {
    /// e.g. "John 3:16".
    pub label: String,
    pub theme: Theme,
}

impl Widget for ContinuePopup {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let question = format!("Continue reading {}?", self.label);
        let width = (question.chars().count() as u16 + 8).max(44);
        let popup = centered_fixed(width, 6, area);
        let inner = frame("Welcome back", popup, &self.theme, buf);

        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(format!("  {question}"), self.theme.popup_style())),
            Line::from(Span::styled("  y/Enter: continue  n/Esc: start here", self.theme.dim_style())),
        ];
        Paragraph::new(lines).render(inner, buf);
    }
}

/// Centered one-line message in `area` (loading and failure states).
pub fn message(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let y = area.y + area.height / 2;
    Paragraph::new(Line::from(Span::styled(text.to_string(), style)).centered())
        .render(Rect::new(area.x, y, area.width, 1), buf);
}

// ───────────────────────────────────────── helpers ───────────

/// Create a centered rectangle with fixed dimensions, clamped to the available area.
fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::ThemeMode;
    use crate::core::search::{JumpTarget, Suggestion};

    fn screen_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn theme() -> Theme {
        Theme::new(ThemeMode::Dark, false)
    }

    #[test]
    fn jump_popup_shows_hint_then_empty_state_then_results() {
        let area = Rect::new(0, 0, 80, 20);
        let mut jump = JumpState::default();

        let mut buf = Buffer::empty(area);
        JumpPopup { jump: &jump, theme: theme() }.render(area, &mut buf);
        assert!(screen_text(&buf).contains("Type to search"));

        jump.query = "zzz".into();
        let mut buf = Buffer::empty(area);
        JumpPopup { jump: &jump, theme: theme() }.render(area, &mut buf);
        assert!(screen_text(&buf).contains(NO_MATCHES));

        jump.query = "john 3".into();
        jump.suggestions = vec![Suggestion {
            target: JumpTarget::Chapter { book: 42, chapter: 2 },
            display: "John 3".into(),
        }];
        let mut buf = Buffer::empty(area);
        JumpPopup { jump: &jump, theme: theme() }.render(area, &mut buf);
        assert!(screen_text(&buf).contains("▸ John 3"));
    }

    #[test]
    fn picker_scrolls_to_offset() {
        let area = Rect::new(0, 0, 60, 24);
        let items: Vec<String> = (1..=30).map(|c| format!("Chapter {c}")).collect();
        let mut picker = PickerState::default();
        picker.select(20, items.len());
        picker.clamp_scroll(PICKER_ROWS);

        let mut buf = Buffer::empty(area);
        PickerPopup {
            title: "Chapter",
            items,
            picker: &picker,
            theme: theme(),
        }
        .render(area, &mut buf);
        let text = screen_text(&buf);
        assert!(text.contains("▸ Chapter 21"));
        assert!(!text.contains("Chapter 9 "));
    }

    #[test]
    fn help_lists_every_action() {
        let area = Rect::new(0, 0, 80, 40);
        let config = AppConfig::default();
        let mut buf = Buffer::empty(area);
        HelpPopup { config: &config, theme: theme() }.render(area, &mut buf);
        let text = screen_text(&buf);
        for action in Action::ALL {
            assert!(text.contains(action.label()), "{action:?} missing");
        }
    }

    #[test]
    fn continue_prompt_names_the_position() {
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        ContinuePopup {
            label: "John 3:16".into(),
            theme: theme(),
        }
        .render(area, &mut buf);
        assert!(screen_text(&buf).contains("Continue reading John 3:16?"));
    }
}
