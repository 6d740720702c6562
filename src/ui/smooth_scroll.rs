//! Row-level smooth scroll with exponential ease-out.
//!
//! The animator owns the fractional scroll position of the reading column.
//! An animated move sets a target; each tick closes a fixed fraction of the
//! remaining distance, so motion decelerates visibly and then lands exactly
//! on the target.

/// What one [`SmoothScroll::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollFrame {
    /// The position changed this frame.
    pub moved: bool,
    /// The animation reached its target this frame.
    pub finished: bool,
}

/// Fractional scroll position plus an optional animation target.
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    position: f64,
    target: Option<f64>,
    /// Fraction of the remaining distance covered per tick.
    /// Good range: 0.25–0.45 at 60 fps.
    speed: f64,
}

impl SmoothScroll {
    /// Distance (rows) below which the animation lands on its target.
    const LANDING: f64 = 0.05;

    pub fn new(speed: f64) -> Self {
        Self {
            position: 0.0,
            target: None,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some()
    }

    /// Move instantly, dropping any animation in flight.
    pub fn jump(&mut self, position: f64) {
        self.position = position;
        self.target = None;
    }

    /// Start (or retarget) an animation.  When the distance exceeds
    /// `max_travel` the position first jumps to `max_travel` rows short of
    /// the target so very long jumps still finish within a few frames.
    pub fn animate_to(&mut self, target: f64, max_travel: f64) {
        let distance = target - self.position;
        if distance.abs() > max_travel {
            self.position = target - max_travel * distance.signum();
        }
        if (target - self.position).abs() < Self::LANDING {
            self.position = target;
            self.target = None;
        } else {
            self.target = Some(target);
        }
    }

    /// Drop the animation, leaving the position where it is.
    pub fn cancel(&mut self) {
        self.target = None;
    }

    /// Advance one frame.
    pub fn tick(&mut self) -> ScrollFrame {
        let Some(target) = self.target else {
            return ScrollFrame::default();
        };
        let remaining = target - self.position;
        if remaining.abs() * (1.0 - self.speed) < Self::LANDING {
            self.position = target;
            self.target = None;
            return ScrollFrame {
                moved: true,
                finished: true,
            };
        }
        self.position += remaining * self.speed;
        ScrollFrame {
            moved: true,
            finished: false,
        }
    }
}
