//! Layout helpers — split the terminal area into regions.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: header with selectors, the reading viewport and a
/// bottom status bar.  In focus mode the reading viewport takes everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header_area: Rect,
    pub reading_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Compute the layout from the full terminal area.
    pub fn from_area(area: Rect, focus_mode: bool) -> Self {
        if focus_mode {
            return Self {
                header_area: Rect::new(area.x, area.y, area.width, 0),
                reading_area: area,
                status_area: Rect::new(area.x, area.bottom(), area.width, 0),
            };
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header: translation / book / chapter
                Constraint::Min(3),    // reading column
                Constraint::Length(1), // status bar
            ])
            .split(area);

        Self {
            header_area: chunks[0],
            reading_area: chunks[1],
            status_area: chunks[2],
        }
    }

    /// The text column inside the reading area, horizontally centred.
    pub fn column_area(&self, column_width: u16) -> Rect {
        let area = self.reading_area;
        let w = column_width.min(area.width);
        let x = area.x + (area.width - w) / 2;
        Rect::new(x, area.y, w, area.height)
    }
}
