//! Start-button debouncing.

use crate::{elapsed_more_than, Instant, Millis};

/// Lets through at most one edge per window, measured from the last edge it let through.
///
/// Rejected edges are dropped, not queued.
#[derive(Clone, Copy, Debug)]
pub struct EdgeDebouncer {
    window: Millis,
    last_accepted: Option<Instant>,
}

impl EdgeDebouncer {
    pub const fn new(window: Millis) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Feed one raw edge. Returns `true` if it is accepted.
    pub fn accept(&mut self, now: Instant) -> bool {
        if elapsed_more_than(now, self.last_accepted, self.window) {
            self.last_accepted = Some(now);
            true
        } else {
            false
        }
    }

    pub fn last_accepted(&self) -> Option<Instant> {
        self.last_accepted
    }
}
