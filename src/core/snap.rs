//! Magnetic snapping once organic scrolling goes quiet.
//!
//! ```text
//!   Idle ──scroll──▶ Scrolling ──(settle window, no events)──▶ Settling ──▶ Idle
//!                      ▲    │                                      │
//!                      └────┘ scroll (resets the settle timer)      └─ snap, unless
//!                                                                     a programmatic
//!                                                                     scroll is in flight
//! ```

use std::time::Instant;

use super::context::ReaderContext;
use super::surface::{self, Surface};
use super::timer::Debounce;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    #[default]
    Idle,
    Scrolling,
    Settling,
}

#[derive(Debug, Clone)]
pub struct SnapController {
    phase: ScrollPhase,
    settle: Debounce,
    /// Centre misalignment (rows) tolerated without a corrective scroll.
    threshold: f64,
}

impl SnapController {
    pub fn new(settle: Debounce, threshold: f64) -> Self {
        Self {
            phase: ScrollPhase::Idle,
            settle,
            threshold: threshold.max(0.0),
        }
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.settle.deadline()
    }

    /// Raw scroll event: (re)enter `Scrolling` and restart the settle window.
    pub fn on_scroll(&mut self, now: Instant) {
        self.phase = ScrollPhase::Scrolling;
        self.settle.schedule(now);
    }

    /// Forget any pending settle (the document was replaced).
    pub fn reset(&mut self) {
        self.settle.cancel();
        self.phase = ScrollPhase::Idle;
    }

    /// Evaluate the snap if the settle window elapsed.  Returns the offset of
    /// the snap scroll that was issued, if any.
    pub fn poll(
        &mut self,
        now: Instant,
        ctx: &ReaderContext,
        surface: &mut dyn Surface,
    ) -> Option<f64> {
        if !self.settle.poll(now) {
            return None;
        }
        self.phase = ScrollPhase::Settling;
        let issued = self.settle_snap(now, ctx, surface);
        self.phase = ScrollPhase::Idle;
        issued
    }

    fn settle_snap(
        &self,
        now: Instant,
        ctx: &ReaderContext,
        surface: &mut dyn Surface,
    ) -> Option<f64> {
        if ctx.scroll_intent.is_active(now) {
            tracing::debug!("snap skipped: programmatic scroll in flight");
            return None;
        }
        let nearest = surface::nearest_unit(surface)?;
        if nearest.distance <= self.threshold {
            return None;
        }
        let extent = surface.measure(nearest.index)?;
        let offset = surface::centered_offset(extent, surface.viewport().height);
        tracing::debug!(
            "snap to unit {} (off by {:.2} rows)",
            nearest.index,
            nearest.distance
        );
        surface.scroll_to(offset, true);
        Some(offset)
    }
}
