//! Loading indicator — a spinner and label centred in the reading area while
//! a translation is parsed in the background.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// Braille-dot spinner frames.  Cycles through these on each tick.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct LoadingIndicator<'a> {
    /// Translation id being loaded.
    pub translation: &'a str,
    /// Monotonically increasing tick counter (drives the spinner frame).
    pub tick: u64,
    pub style: Style,
}

impl LoadingIndicator<'_> {
    fn label(&self) -> String {
        let frame = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        format!("{frame} Loading {}…", self.translation)
    }
}

impl Widget for LoadingIndicator<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let label = self.label();
        let width = (label.chars().count() as u16).min(area.width);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + area.height / 2;
        buf.set_line(x, y, &Line::from(Span::styled(label, self.style)), width);
    }
}
