//! Reading column — every unit word-wrapped and stacked vertically.
//!
//! This is the rendering surface the scroll engine measures.  Offsets and
//! heights are in terminal rows; the scroll position is fractional so
//! animations can move by less than a row per frame.  Rows are drawn at
//! `scroll_top.round()`.

use textwrap::Options;

use crate::core::flatten::Unit;
use crate::core::surface::{self, Surface};
use crate::core::tracker::{UnitExtent, Viewport};

use super::smooth_scroll::{ScrollFrame, SmoothScroll};

/// Column width (characters) at 100% font size.
pub const BASE_COLUMN_WIDTH: u16 = 72;
const MIN_COLUMN_WIDTH: u16 = 20;
const ANIMATION_SPEED: f64 = 0.3;
/// Line of a heading unit that carries the title (blank, title, blank).
pub const HEADING_TITLE_LINE: usize = 1;

/// Text column width for a font-size percentage, bounded by `available`.
pub fn column_width(font_size: u16, available: u16) -> u16 {
    let wanted = (BASE_COLUMN_WIDTH as u32 * 100 / font_size.max(1) as u32) as u16;
    wanted.min(available).max(MIN_COLUMN_WIDTH.min(available))
}

fn wrap_unit(unit: &Unit, width: u16) -> Vec<String> {
    match unit {
        Unit::ChapterHeading { text, .. } => vec![String::new(), text.clone(), String::new()],
        Unit::Verse {
            verse_number, text, ..
        } => {
            let prefix = format!("{verse_number} ");
            let indent = " ".repeat(prefix.len());
            let body = format!("{prefix}{text}");
            let options = Options::new(width.max(1) as usize).subsequent_indent(&indent);
            let lines: Vec<String> = textwrap::wrap(&body, options)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();
            if lines.is_empty() {
                vec![prefix]
            } else {
                lines
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnLayout {
    width: u16,
    viewport_height: f64,
    lines: Vec<Vec<String>>,
    tops: Vec<f64>,
    total_height: f64,
    scroll: SmoothScroll,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            width: BASE_COLUMN_WIDTH,
            viewport_height: 0.0,
            lines: Vec::new(),
            tops: Vec::new(),
            total_height: 0.0,
            scroll: SmoothScroll::new(ANIMATION_SPEED),
        }
    }
}

impl ColumnLayout {
    /// Wrap every unit to `width` and recompute all offsets.  The scroll
    /// position is kept (clamped); callers re-centre the cursor afterwards.
    pub fn relayout(&mut self, units: &[Unit], width: u16, viewport_height: u16) {
        self.width = width;
        self.viewport_height = viewport_height as f64;
        self.lines = units.iter().map(|u| wrap_unit(u, width)).collect();
        self.tops = Vec::with_capacity(self.lines.len());
        let mut top = 0.0;
        for lines in &self.lines {
            self.tops.push(top);
            top += lines.len() as f64;
        }
        self.total_height = top;
        let clamped = self.clamp_offset(self.scroll.position());
        self.scroll.jump(clamped);
        tracing::debug!(
            "column relayout: {} units, {} rows at width {width}",
            self.lines.len(),
            self.total_height
        );
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll.position()
    }

    pub fn is_animating(&self) -> bool {
        self.scroll.is_animating()
    }

    /// Wrapped lines of one unit.
    pub fn unit_lines(&self, index: usize) -> &[String] {
        self.lines.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Organic scroll by `rows` (wheel input).  Cancels any animation in
    /// flight.  Returns `true` when the position changed.
    pub fn scroll_by(&mut self, rows: f64) -> bool {
        let before = self.scroll.position();
        let next = self.clamp_offset(before + rows);
        self.scroll.jump(next);
        next != before
    }

    /// Advance the animation by one frame.
    pub fn tick(&mut self) -> ScrollFrame {
        self.scroll.tick()
    }

    /// First document row drawn at the top of the viewport.
    fn first_row(&self) -> i64 {
        self.scroll.position().round() as i64
    }

    /// Unit drawn at viewport row `row`, if any.
    pub fn unit_at_row(&self, row: u16) -> Option<usize> {
        self.locate_row(self.first_row() + row as i64).map(|(unit, _)| unit)
    }

    /// `(unit, line)` drawn at absolute document row `row`.
    fn locate_row(&self, row: i64) -> Option<(usize, usize)> {
        if row < 0 || row as f64 >= self.total_height {
            return None;
        }
        let y = row as f64;
        let unit = self.tops.partition_point(|top| *top <= y).checked_sub(1)?;
        let line = (y - self.tops[unit]) as usize;
        Some((unit, line))
    }

    /// For each viewport row, the `(unit, line)` drawn there.
    pub fn visible_rows(&self) -> Vec<Option<(usize, usize)>> {
        let first = self.first_row();
        (0..self.viewport_height as i64)
            .map(|r| self.locate_row(first + r))
            .collect()
    }

    /// Offsets are bounded so the first and the last unit can both reach
    /// the viewport centre.
    fn clamp_offset(&self, offset: f64) -> f64 {
        let Some(last_index) = self.lines.len().checked_sub(1) else {
            return 0.0;
        };
        let (Some(first), Some(last)) = (self.measure(0), self.measure(last_index)) else {
            return 0.0;
        };
        let min = surface::centered_offset(first, self.viewport_height);
        let max = surface::centered_offset(last, self.viewport_height);
        offset.clamp(min, max.max(min))
    }

    fn max_travel(&self) -> f64 {
        (self.viewport_height * 2.0).max(40.0)
    }
}

impl Surface for ColumnLayout {
    fn unit_count(&self) -> usize {
        self.lines.len()
    }

    fn measure(&self, index: usize) -> Option<UnitExtent> {
        let top = *self.tops.get(index)?;
        let height = self.lines.get(index)?.len() as f64;
        Some(UnitExtent { top, height })
    }

    fn viewport(&self) -> Viewport {
        Viewport {
            scroll_top: self.scroll.position(),
            height: self.viewport_height,
        }
    }

    fn scroll_to(&mut self, offset: f64, animated: bool) {
        let offset = self.clamp_offset(offset);
        if animated {
            let travel = self.max_travel();
            self.scroll.animate_to(offset, travel);
        } else {
            self.scroll.jump(offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::document::{Book, Document};
    use crate::core::flatten::FlatDocument;

    fn column(verses: Vec<&str>, width: u16, height: u16) -> (FlatDocument, ColumnLayout) {
        let chapter = verses.into_iter().map(String::from).collect();
        let flat = FlatDocument::build(&Document::new(vec![Book::new("Test", vec![chapter])]));
        let mut col = ColumnLayout::default();
        col.relayout(flat.units(), width, height);
        (flat, col)
    }

    #[test]
    fn column_width_follows_font_size() {
        assert_eq!(column_width(100, 200), 72);
        assert_eq!(column_width(150, 200), 48);
        assert_eq!(column_width(70, 200), 102);
        assert_eq!(column_width(70, 60), 60);
        assert_eq!(column_width(100, 10), 10);
    }

    #[test]
    fn units_are_wrapped_and_stacked() {
        let (_, col) = column(vec!["one two three four", "five"], 10, 10);
        // heading: 3 rows; verse 1: "1 one two" / "  three" / "  four"
        assert_eq!(col.unit_lines(1), ["1 one two", "  three", "  four"]);
        assert_eq!(col.measure(0), Some(UnitExtent { top: 0.0, height: 3.0 }));
        assert_eq!(col.measure(1), Some(UnitExtent { top: 3.0, height: 3.0 }));
        assert_eq!(col.measure(2), Some(UnitExtent { top: 6.0, height: 1.0 }));
        assert_eq!(col.total_height(), 7.0);
        assert_eq!(col.measure(3), None);
    }

    #[test]
    fn hit_testing_maps_rows_to_units() {
        let (_, mut col) = column(vec!["a", "b", "c", "d", "e", "f"], 20, 4);
        col.scroll_to(3.0, false);
        assert_eq!(col.unit_at_row(0), Some(1));
        assert_eq!(col.unit_at_row(2), Some(3));
        assert_eq!(col.visible_rows()[3], Some((4, 0)));
    }

    #[test]
    fn offsets_clamp_to_centrable_range() {
        let (_, mut col) = column(vec!["a", "b", "c"], 20, 10);
        // first unit centre 1.5 → min -3.5; last unit (top 5) centre 5.5 → max 0.5
        col.scroll_to(-100.0, false);
        assert_eq!(col.scroll_top(), -3.5);
        assert_eq!(col.unit_at_row(0), None);
        col.scroll_to(100.0, false);
        assert_eq!(col.scroll_top(), 0.5);
    }

    #[test]
    fn wheel_cancels_animation() {
        let verses: Vec<String> = (0..100).map(|i| format!("verse {i}")).collect();
        let (_, mut col) = column(verses.iter().map(String::as_str).collect(), 40, 10);
        col.scroll_to(60.0, true);
        assert!(col.is_animating());
        let frame = col.tick();
        assert!(frame.moved && !frame.finished);
        assert!(col.scroll_by(3.0));
        assert!(!col.is_animating());
    }

    #[test]
    fn animated_scroll_finishes_on_target() {
        let verses: Vec<String> = (0..100).map(|i| format!("verse {i}")).collect();
        let (_, mut col) = column(verses.iter().map(String::as_str).collect(), 40, 10);
        col.scroll_to(60.0, true);
        let mut frames = 0;
        while !col.tick().finished {
            frames += 1;
            assert!(frames < 60);
        }
        assert_eq!(col.scroll_top(), 60.0);
        assert_eq!(surface::nearest_unit(&col).map(|n| n.index), Some(62));
    }
}
