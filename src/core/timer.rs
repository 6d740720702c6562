//! Deadline-based timers for a single-threaded event loop.
//!
//! Nothing here sleeps.  The event loop asks for the earliest pending
//! deadline, sleeps until then, and polls with the current [`Instant`].
//! Scheduling a [`Debounce`] again replaces its deadline, which is the only
//! cancellation primitive we need.

use std::time::{Duration, Instant};

/// Trailing-edge debounce: fires once, `window` after the last `schedule`.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// (Re)arm the timer relative to `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Arm for an explicit instant (used to defer a firing).
    pub fn schedule_at(&mut self, at: Instant) {
        self.deadline = Some(at);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// `true` exactly once when the deadline has passed; disarms itself.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A flag that is raised with an expiry and can never stay up forever.
#[derive(Debug, Clone, Default)]
pub struct Hold {
    until: Option<Instant>,
}

impl Hold {
    /// Raise the flag for `duration` from `now`.  Raising again while already
    /// raised restarts the hold.
    pub fn engage(&mut self, now: Instant, duration: Duration) {
        self.until = Some(now + duration);
    }

    /// Bring the expiry forward to `at` if that is earlier.  Never extends.
    pub fn shorten_to(&mut self, at: Instant) {
        if let Some(until) = self.until {
            if at < until {
                self.until = Some(at);
            }
        }
    }

    pub fn release(&mut self) {
        self.until = None;
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now < until)
    }

    /// Pending expiry, if the flag is (or was until recently) raised.
    pub fn expiry(&self) -> Option<Instant> {
        self.until
    }

    /// Drop an expired hold so `expiry` stops reporting it.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}
