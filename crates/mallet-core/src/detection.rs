//! Scoring sensors.
//!
//! Each sensor has its own slot with an arm/cooldown cycle. On top of that a single
//! timestamp shared by all slots keeps two sensors from both being credited for one
//! ball crossing.

use crate::{elapsed_more_than, Instant, Millis};

/// Per-sensor state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SensorSlot {
    pub present: bool,
    /// Set once a rising edge has been credited; cleared when the signal goes away
    /// and the cooldown is over.
    pub armed: bool,
    pub cooldown_until: Option<Instant>,
}

impl SensorSlot {
    pub const IDLE: Self = Self {
        present: false,
        armed: false,
        cooldown_until: None,
    };

    fn cooling_down(&self, now: Instant) -> bool {
        matches!(self.cooldown_until, Some(until) if now < until)
    }
}

/// A credited detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    pub sensor: usize,
    pub at: Instant,
}

pub struct DetectionArray<const N: usize> {
    slots: [SensorSlot; N],
    last_detection: Option<Instant>,
    cooldown: Millis,
    gap: Millis,
}

impl<const N: usize> DetectionArray<N> {
    pub const fn new(cooldown: Millis, gap: Millis) -> Self {
        Self {
            slots: [SensorSlot::IDLE; N],
            last_detection: None,
            cooldown,
            gap,
        }
    }

    /// Run one polling pass over all slots in index order.
    ///
    /// At most one detection is credited per pass: once a slot is credited the shared
    /// gap has not elapsed for any later slot.
    pub fn poll(&mut self, now: Instant, readings: &[bool; N]) -> Option<Detection> {
        let mut credited = None;

        for (sensor, (slot, &present)) in self.slots.iter_mut().zip(readings).enumerate() {
            slot.present = present;
            if slot.cooling_down(now) {
                continue;
            }

            if present && !slot.armed {
                if !elapsed_more_than(now, self.last_detection, self.gap) {
                    continue;
                }
                slot.armed = true;
                slot.cooldown_until = Some(now + self.cooldown);
                self.last_detection = Some(now);
                credited = Some(Detection { sensor, at: now });
            } else if !present {
                slot.armed = false;
            }
        }

        credited
    }

    /// Forget every slot and the shared gap, for a fresh round.
    pub fn reset(&mut self) {
        self.slots = [SensorSlot::IDLE; N];
        self.last_detection = None;
    }

    pub fn slots(&self) -> &[SensorSlot; N] {
        &self.slots
    }

    pub fn last_detection(&self) -> Option<Instant> {
        self.last_detection
    }
}
