//! Capability interface to whatever actually lays units out on screen.
//!
//! The snapping and tracking logic only ever needs to measure a unit, read
//! the viewport and request a scroll.  The terminal column in
//! `ui::column` implements this for real; tests use [`fake::FakeSurface`].

use super::tracker::{self, Nearest, UnitExtent, Viewport};

pub trait Surface {
    /// Number of measurable units (may be 0 before a document is laid out).
    fn unit_count(&self) -> usize;

    /// Placement of a unit, `None` when it has not been laid out.
    fn measure(&self, index: usize) -> Option<UnitExtent>;

    fn viewport(&self) -> Viewport;

    /// Move the viewport so its top edge is at `offset`.  With `animated` the
    /// move happens over several frames; every frame is reported back to the
    /// session as a raw scroll event.
    fn scroll_to(&mut self, offset: f64, animated: bool);
}

/// Scroll offset that puts the centre of `extent` at the viewport centre.
pub fn centered_offset(extent: UnitExtent, viewport_height: f64) -> f64 {
    extent.top - viewport_height / 2.0 + extent.height / 2.0
}

/// Run [`tracker::locate_center`] against the current layout.
pub fn nearest_unit(surface: &dyn Surface) -> Option<Nearest> {
    let positions = (0..surface.unit_count()).filter_map(|i| surface.measure(i).map(|e| (i, e)));
    tracker::locate_center(positions, surface.viewport())
}

/// Deterministic in-memory surface with a fixed synthetic layout.
#[cfg(test)]
pub mod fake {
    use super::*;

    #[derive(Debug, Clone)]
    pub struct FakeSurface {
        pub extents: Vec<UnitExtent>,
        pub viewport: Viewport,
        /// Every `scroll_to` request, in order.
        pub scrolls: Vec<(f64, bool)>,
    }

    impl FakeSurface {
        /// `count` units of equal `unit_height`, stacked from 0.
        pub fn uniform(count: usize, unit_height: f64, viewport_height: f64) -> Self {
            let extents = (0..count)
                .map(|i| UnitExtent {
                    top: i as f64 * unit_height,
                    height: unit_height,
                })
                .collect();
            Self {
                extents,
                viewport: Viewport {
                    scroll_top: 0.0,
                    height: viewport_height,
                },
                scrolls: Vec::new(),
            }
        }

        pub fn set_scroll_top(&mut self, top: f64) {
            self.viewport.scroll_top = top;
        }
    }

    impl Surface for FakeSurface {
        fn unit_count(&self) -> usize {
            self.extents.len()
        }

        fn measure(&self, index: usize) -> Option<UnitExtent> {
            self.extents.get(index).copied()
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        /// Applies the move instantly; the session under test decides how
        /// many raw scroll events it sees.
        fn scroll_to(&mut self, offset: f64, animated: bool) {
            self.scrolls.push((offset, animated));
            self.viewport.scroll_top = offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeSurface;
    use super::*;

    #[test]
    fn centered_offset_aligns_centres() {
        let e = UnitExtent {
            top: 40.0,
            height: 4.0,
        };
        let off = centered_offset(e, 10.0);
        let vp = Viewport {
            scroll_top: off,
            height: 10.0,
        };
        assert_eq!(vp.center(), e.center());
    }

    #[test]
    fn nearest_unit_on_empty_surface_is_none() {
        let s = FakeSurface::uniform(0, 2.0, 10.0);
        assert_eq!(nearest_unit(&s), None);
    }
}
