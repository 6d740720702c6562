//! Custom Ratatui widget that draws the visible slice of the reading column.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::flatten::{FlatDocument, Unit};

use super::column::{ColumnLayout, HEADING_TITLE_LINE};
use super::theme::Theme;

/// Created fresh each frame.
pub struct ReaderWidget<'a> {
    column: &'a ColumnLayout,
    doc: &'a FlatDocument,
    cursor: usize,
    theme: Theme,
}

impl<'a> ReaderWidget<'a> {
    pub fn new(column: &'a ColumnLayout, doc: &'a FlatDocument, cursor: usize, theme: Theme) -> Self {
        Self {
            column,
            doc,
            cursor,
            theme,
        }
    }

    fn render_line(&self, unit: &Unit, index: usize, line: usize) -> Line<'a> {
        let text = self.column.unit_lines(index).get(line).cloned().unwrap_or_default();
        let highlight = if index == self.cursor {
            self.theme.cursor_style()
        } else {
            ratatui::style::Style::default()
        };

        match unit {
            Unit::ChapterHeading { .. } => {
                if line == HEADING_TITLE_LINE {
                    Line::from(Span::styled(text, self.theme.heading_style().patch(highlight)))
                        .centered()
                } else {
                    Line::default()
                }
            }
            Unit::Verse { verse_number, .. } => {
                let body = self.theme.verse_style().patch(highlight);
                if line > 0 {
                    return Line::from(Span::styled(text, body));
                }
                let number_len = verse_number.to_string().len();
                let split = number_len.min(text.len());
                let (number, rest) = text.split_at(split);
                Line::from(vec![
                    Span::styled(
                        number.to_string(),
                        self.theme.verse_number_style().patch(highlight),
                    ),
                    Span::styled(rest.to_string(), body),
                ])
            }
        }
    }
}

impl Widget for ReaderWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.page_style());
        for (row, slot) in self.column.visible_rows().into_iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.bottom() {
                break;
            }
            let Some((index, line)) = slot else {
                continue;
            };
            let Some(unit) = self.doc.get(index) else {
                continue;
            };
            let rendered = self.render_line(unit, index, line);
            let line_area = Rect::new(area.x, y, area.width, 1);
            if index == self.cursor {
                buf.set_style(line_area, self.theme.cursor_style());
            }
            rendered.render(line_area, buf);
        }
    }
}
