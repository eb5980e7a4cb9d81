//! Countdown state shared between the 1 s timer interrupt and the polling loop.
//!
//! The interrupt only ever calls [`TickSource::on_tick`]. Everything else is called from
//! the loop, and the multi-word updates happen inside a critical section so the
//! interrupt cannot land between them.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// What a single tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Timer not running (or already at zero); nothing changed.
    Ignored,
    /// Countdown went down by one and is still above zero.
    Decremented(u32),
    /// Countdown reached zero on this tick.
    Expired,
}

pub struct TickSource {
    remaining: AtomicU32,
    active: AtomicBool,
    expired: AtomicBool,
}

impl TickSource {
    pub const fn new() -> Self {
        Self {
            remaining: AtomicU32::new(0),
            active: AtomicBool::new(false),
            expired: AtomicBool::new(false),
        }
    }

    /// Timer interrupt body. O(1), no allocation, touches only the three shared words.
    pub fn on_tick(&self) -> Tick {
        if !self.active.load(Ordering::Acquire) {
            return Tick::Ignored;
        }
        let remaining = self.remaining.load(Ordering::Acquire);
        if remaining == 0 {
            return Tick::Ignored;
        }

        let remaining = remaining - 1;
        self.remaining.store(remaining, Ordering::Release);
        if remaining == 0 {
            self.active.store(false, Ordering::Release);
            self.expired.store(true, Ordering::Release);
            Tick::Expired
        } else {
            Tick::Decremented(remaining)
        }
    }

    /// Load `seconds` and start counting on the next tick.
    pub fn arm(&self, seconds: u32) {
        critical_section::with(|_| {
            self.expired.store(false, Ordering::Relaxed);
            self.remaining.store(seconds, Ordering::Relaxed);
            self.active.store(seconds > 0, Ordering::Release);
        });
    }

    /// Load `seconds` without starting the countdown.
    pub fn preload(&self, seconds: u32) {
        critical_section::with(|_| {
            self.active.store(false, Ordering::Relaxed);
            self.expired.store(false, Ordering::Relaxed);
            self.remaining.store(seconds, Ordering::Release);
        });
    }

    /// Stop counting and clear any pending expiry.
    pub fn disarm(&self) {
        critical_section::with(|_| {
            self.active.store(false, Ordering::Relaxed);
            self.expired.store(false, Ordering::Release);
        });
    }

    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Consume the expiry flag set by the interrupt. Returns `true` at most once per expiry.
    pub fn take_expired(&self) -> bool {
        self.expired.swap(false, Ordering::AcqRel)
    }
}

impl Default for TickSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_ticks_change_nothing() {
        let ticks = TickSource::new();
        ticks.preload(30);
        assert_eq!(ticks.on_tick(), Tick::Ignored);
        assert_eq!(ticks.remaining(), 30);
        assert!(!ticks.take_expired());
    }

    #[test]
    fn counts_down_to_zero_and_stops() {
        let ticks = TickSource::new();
        ticks.arm(3);
        assert!(ticks.is_active());
        assert_eq!(ticks.on_tick(), Tick::Decremented(2));
        assert_eq!(ticks.on_tick(), Tick::Decremented(1));
        assert_eq!(ticks.on_tick(), Tick::Expired);
        assert!(!ticks.is_active());
        assert_eq!(ticks.remaining(), 0);

        // further ticks never go below zero
        assert_eq!(ticks.on_tick(), Tick::Ignored);
        assert_eq!(ticks.remaining(), 0);
    }

    #[test]
    fn expiry_is_reported_once() {
        let ticks = TickSource::new();
        ticks.arm(1);
        assert_eq!(ticks.on_tick(), Tick::Expired);
        assert!(ticks.take_expired());
        assert!(!ticks.take_expired());
    }

    #[test]
    fn rearming_clears_stale_expiry() {
        let ticks = TickSource::new();
        ticks.arm(1);
        ticks.on_tick();
        ticks.arm(90);
        assert!(!ticks.take_expired());
        assert_eq!(ticks.remaining(), 90);
    }

    #[test]
    fn disarm_freezes_countdown() {
        let ticks = TickSource::new();
        ticks.arm(10);
        ticks.on_tick();
        ticks.disarm();
        assert_eq!(ticks.on_tick(), Tick::Ignored);
        assert_eq!(ticks.remaining(), 9);
    }

    #[test]
    fn arming_zero_seconds_does_not_start() {
        let ticks = TickSource::new();
        ticks.arm(0);
        assert!(!ticks.is_active());
        assert_eq!(ticks.on_tick(), Tick::Ignored);
    }
}
