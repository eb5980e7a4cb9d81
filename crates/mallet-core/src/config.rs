//! Startup constants for a game round.

use crate::Millis;

/// Default round length, in seconds.
pub const GAME_TIME_SECS: u32 = 30;

/// Optional stage between the start press and the countdown, while the intro track plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntroStage {
    pub track: u8,
    pub duration: Millis,
}

/// Track numbers on the audio module's storage. `None` means stay silent for that event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tracks {
    pub round_start: Option<u8>,
    pub goal: Option<u8>,
    pub round_over: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    pub round_secs: u32,
    pub intro: Option<IntroStage>,
    /// How long Finished is held before going back to Idle.
    pub finish_hold: Millis,
    pub start_debounce: Millis,
    pub sensor_cooldown: Millis,
    /// Minimum gap between two credited detections across all sensors.
    pub detection_gap: Millis,
    /// Module volume, clamped to `0..=MAX_VOLUME` when sent.
    pub volume: u8,
    pub tracks: Tracks,
}

impl GameConfig {
    pub const DEFAULT: Self = Self {
        round_secs: GAME_TIME_SECS,
        intro: None,
        finish_hold: Millis::from_ticks(5_000),
        start_debounce: Millis::from_ticks(200),
        sensor_cooldown: Millis::from_ticks(1_000),
        detection_gap: Millis::from_ticks(200),
        volume: 20,
        tracks: Tracks {
            round_start: Some(2),
            goal: Some(3),
            round_over: 4,
        },
    };

    pub const fn with_round_secs(mut self, round_secs: u32) -> Self {
        self.round_secs = round_secs;
        self
    }

    pub const fn with_intro(mut self, track: u8, duration: Millis) -> Self {
        self.intro = Some(IntroStage { track, duration });
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
