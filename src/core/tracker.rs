//! Cursor tracking — which unit sits under the viewport centre?
//!
//! [`locate_center`] is a pure O(n) query over measured unit extents.  It is
//! called from the trailing edge of the update debounce, never per raw scroll
//! event, so a linear scan over a whole Bible (~32k units) stays well inside
//! one frame.

use std::time::Instant;

use super::context::ReaderContext;
use super::surface::{self, Surface};
use super::timer::Debounce;

// ───────────────────────────────────────── geometry ──────────

/// Measured vertical placement of one rendered unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitExtent {
    pub top: f64,
    pub height: f64,
}

impl UnitExtent {
    pub fn center(self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// The visible window onto the column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(self) -> f64 {
        self.scroll_top + self.height / 2.0
    }
}

/// Result of a centre query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    /// Absolute distance between the unit centre and the viewport centre.
    pub distance: f64,
}

/// Index of the unit whose centre is closest to the viewport centre.
///
/// Ties go to the earliest unit: a later unit must be *strictly* closer to
/// replace the current best.  Returns `None` when nothing was measured.
pub fn locate_center<I>(positions: I, viewport: Viewport) -> Option<Nearest>
where
    I: IntoIterator<Item = (usize, UnitExtent)>,
{
    let target = viewport.center();
    let mut best: Option<Nearest> = None;
    for (index, extent) in positions {
        let distance = (target - extent.center()).abs();
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Nearest { index, distance });
        }
    }
    best
}

// ───────────────────────────────────────── tracker ───────────

/// Debounced cursor recomputation driven by raw scroll events.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    update: Debounce,
}

impl CursorTracker {
    pub fn new(update: Debounce) -> Self {
        Self { update }
    }

    /// A raw scroll event arrived; push the update back.
    pub fn on_scroll(&mut self, now: Instant) {
        self.update.schedule(now);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.update.deadline()
    }

    pub fn cancel(&mut self) {
        self.update.cancel();
    }

    /// Run the update if it is due.  Returns the new cursor when it changed.
    ///
    /// While a programmatic scroll is in flight the update is deferred to the
    /// moment the scroll intent expires, so intermediate animation frames
    /// never move the cursor.
    pub fn poll(
        &mut self,
        now: Instant,
        ctx: &mut ReaderContext,
        surface: &dyn Surface,
    ) -> Option<usize> {
        if !self.update.poll(now) {
            return None;
        }
        if ctx.scroll_intent.is_active(now) {
            if let Some(expiry) = ctx.scroll_intent.expiry() {
                self.update.schedule_at(expiry);
            }
            return None;
        }
        let nearest = surface::nearest_unit(surface)?;
        if nearest.index == ctx.cursor {
            return None;
        }
        ctx.cursor = nearest.index;
        Some(nearest.index)
    }
}
