//! Round logic for the mallet game timer.
//!
//! Everything here is hardware independent: the firmware feeds in timestamps, tick
//! interrupts, the start button and per-sensor presence, and gets back audio frames
//! (through [`AudioLink`]) and display snapshots (through [`DisplayNotifier`]).
#![cfg_attr(not(test), no_std)]

pub mod audio;
pub mod config;
pub mod debounce;
pub mod detection;
pub mod display;
pub mod game;
pub mod tick;

/// Millisecond timestamp from the caller's monotonic clock.
pub type Instant = fugit::TimerInstantU64<1000>;
/// Millisecond window.
pub type Millis = fugit::MillisDurationU64;

pub use audio::{AudioCommand, AudioEncoder, AudioLink};
pub use config::{GameConfig, IntroStage, Tracks};
pub use debounce::EdgeDebouncer;
pub use detection::{Detection, DetectionArray, SensorSlot};
pub use display::{DisplayNotifier, Readout, Snapshot};
pub use game::{Game, GameState, Goal, PollReport};
pub use tick::{Tick, TickSource};

/// `true` when strictly more than `window` has passed since `since`.
///
/// A missing `since` means nothing has happened yet, which always counts as elapsed.
pub(crate) fn elapsed_more_than(now: Instant, since: Option<Instant>, window: Millis) -> bool {
    match since {
        None => true,
        Some(since) => match now.checked_duration_since(since) {
            Some(gap) => gap > window,
            None => false,
        },
    }
}
