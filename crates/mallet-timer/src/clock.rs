use mallet_core::Instant;
use microbit::{
    hal::timer::{Periodic, Timer},
    pac::TIMER2,
};

/// Millisecond clock built on a free-running 1 MHz timer.
///
/// The 32-bit counter wraps every ~71 minutes; each read folds the wrapping delta into a
/// 64-bit total, so `now` must be called at least that often.
pub struct Monotonic {
    timer: Timer<TIMER2, Periodic>,
    last_raw: u32,
    micros: u64,
}

impl Monotonic {
    pub fn new(mut timer: Timer<TIMER2, Periodic>) -> Self {
        timer.start(u32::MAX);
        Self {
            timer,
            last_raw: 0,
            micros: 0,
        }
    }

    pub fn now(&mut self) -> Instant {
        let raw = self.timer.read();
        self.micros += u64::from(raw.wrapping_sub(self.last_raw));
        self.last_raw = raw;
        Instant::from_ticks(self.micros / 1_000)
    }
}
