//! The round state machine.
//!
//! Owns the game state, score and sensor slots. The countdown itself lives in the shared
//! [`TickSource`], which the timer interrupt decrements; the machine only arms it and
//! picks up the expiry flag on its next poll.

use crate::{
    audio::{AudioEncoder, AudioLink},
    config::GameConfig,
    debounce::EdgeDebouncer,
    detection::DetectionArray,
    display::{DisplayNotifier, Snapshot},
    tick::TickSource,
    Instant,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    /// Intro track playing, countdown loaded but not running.
    Priming,
    Counting,
    Finished,
}

/// A detection credited to the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Goal {
    pub sensor: usize,
    pub score: u32,
}

/// What happened during one [`Game::poll`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollReport {
    pub entered: Option<GameState>,
    pub goal: Option<Goal>,
    /// New countdown value, if the timer moved since the last poll.
    pub countdown: Option<u32>,
}

pub struct Game<'t, A, D, const N: usize> {
    config: GameConfig,
    ticks: &'t TickSource,
    audio: AudioEncoder<A>,
    display: D,

    state: GameState,
    score: u32,
    start_button: EdgeDebouncer,
    sensors: DetectionArray<N>,
    /// End of the current Priming or Finished stage.
    stage_ends: Option<Instant>,
    finish_announced: bool,
    shown_countdown: u32,
}

impl<'t, A, D, const N: usize> Game<'t, A, D, N>
where
    A: AudioLink,
    D: DisplayNotifier,
{
    pub fn new(config: GameConfig, ticks: &'t TickSource, audio: A, display: D) -> Self {
        Self {
            config,
            ticks,
            audio: AudioEncoder::new(audio),
            display,
            state: GameState::Idle,
            score: 0,
            start_button: EdgeDebouncer::new(config.start_debounce),
            sensors: DetectionArray::new(config.sensor_cooldown, config.detection_gap),
            stage_ends: None,
            finish_announced: false,
            shown_countdown: 0,
        }
    }

    /// Put the module and display into a known state. Call once before the loop starts.
    pub fn boot(&mut self) {
        self.audio.set_volume(self.config.volume);
        self.audio.stop();
        self.ticks.preload(self.round_secs());
        self.shown_countdown = self.round_secs();
        self.publish();
    }

    /// Feed a raw start-button edge. Returns `true` if it started a round.
    ///
    /// The debounce window applies whatever the state; edges outside Idle are then ignored.
    pub fn start_edge(&mut self, now: Instant) -> bool {
        if !self.start_button.accept(now) {
            return false;
        }
        if self.state != GameState::Idle {
            return false;
        }
        self.begin_round(now);
        true
    }

    /// One pass of the polling loop. Bounded work, never blocks.
    pub fn poll(&mut self, now: Instant, readings: &[bool; N]) -> PollReport {
        let mut report = PollReport::default();

        match self.state {
            GameState::Idle => {}
            GameState::Priming => {
                if self.stage_over(now) {
                    self.enter_counting();
                    report.entered = Some(GameState::Counting);
                }
            }
            GameState::Counting => {
                if self.ticks.take_expired() {
                    self.enter_finished(now);
                    report.entered = Some(GameState::Finished);
                    return report;
                }

                let remaining = self.ticks.remaining();
                if remaining != self.shown_countdown {
                    self.shown_countdown = remaining;
                    report.countdown = Some(remaining);
                    self.publish();
                }

                if let Some(hit) = self.sensors.poll(now, readings) {
                    self.score = self.score.saturating_add(1);
                    report.goal = Some(Goal {
                        sensor: hit.sensor,
                        score: self.score,
                    });
                    if let Some(track) = self.config.tracks.goal {
                        self.audio.play(track);
                    }
                    self.publish();
                }
            }
            GameState::Finished => {
                // a late or repeated expiry must not replay the round-over track
                let _ = self.ticks.take_expired();
                if self.stage_over(now) {
                    self.enter_idle();
                    report.entered = Some(GameState::Idle);
                }
            }
        }

        report
    }

    fn begin_round(&mut self, now: Instant) {
        self.score = 0;
        self.sensors.reset();
        self.finish_announced = false;
        self.ticks.preload(self.round_secs());
        self.shown_countdown = self.round_secs();

        match self.config.intro {
            Some(intro) => {
                self.state = GameState::Priming;
                self.stage_ends = Some(now + intro.duration);
                self.audio.play(intro.track);
                self.publish();
            }
            None => self.enter_counting(),
        }
    }

    fn enter_counting(&mut self) {
        self.state = GameState::Counting;
        self.stage_ends = None;
        self.ticks.arm(self.round_secs());
        self.shown_countdown = self.round_secs();
        self.publish();
        if let Some(track) = self.config.tracks.round_start {
            self.audio.play(track);
        }
    }

    fn enter_finished(&mut self, now: Instant) {
        self.state = GameState::Finished;
        self.ticks.disarm();
        self.shown_countdown = 0;
        self.stage_ends = Some(now + self.config.finish_hold);
        self.publish();
        if !self.finish_announced {
            self.finish_announced = true;
            self.audio.play(self.config.tracks.round_over);
        }
    }

    fn enter_idle(&mut self) {
        self.state = GameState::Idle;
        self.score = 0;
        self.sensors.reset();
        self.stage_ends = None;
        self.finish_announced = false;
        self.ticks.preload(self.round_secs());
        self.shown_countdown = self.round_secs();
        self.publish();
    }

    fn stage_over(&self, now: Instant) -> bool {
        matches!(self.stage_ends, Some(end) if now >= end)
    }

    // A zero-length round would never tick down to an expiry.
    fn round_secs(&self) -> u32 {
        self.config.round_secs.max(1)
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.display.show(snapshot);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            countdown: self.countdown(),
            score: self.score,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn countdown(&self) -> u32 {
        self.ticks.remaining()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn audio_link(&self) -> &A {
        self.audio.link()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Millis;

    #[derive(Default)]
    struct Frames(Vec<Vec<u8>>);

    impl AudioLink for Frames {
        fn send(&mut self, frame: &[u8]) {
            self.0.push(frame.to_vec());
        }
    }

    #[derive(Default)]
    struct Shown(Vec<Snapshot>);

    impl DisplayNotifier for Shown {
        fn show(&mut self, snapshot: Snapshot) {
            self.0.push(snapshot);
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms)
    }

    fn played(frames: &Frames) -> Vec<u8> {
        frames
            .0
            .iter()
            .filter(|f| f[1] == 0x07)
            .map(|f| f[4])
            .collect()
    }

    #[test]
    fn boot_sets_volume_then_stops() {
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(GameConfig::DEFAULT, &ticks, Frames::default(), Shown::default());
        game.boot();

        let frames = &game.audio_link().0;
        assert_eq!(frames[0], vec![0xAA, 0x13, 0x01, 20, 0xD2]);
        assert_eq!(frames[1], vec![0xAA, 0x04, 0x00, 0xAE]);
        assert_eq!(
            game.display().0.last().copied(),
            Some(Snapshot {
                state: GameState::Idle,
                countdown: 30,
                score: 0
            })
        );
    }

    #[test]
    fn start_without_intro_goes_straight_to_counting() {
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(GameConfig::DEFAULT, &ticks, Frames::default(), Shown::default());
        assert!(game.start_edge(at(0)));
        assert_eq!(game.state(), GameState::Counting);
        assert!(ticks.is_active());
        assert_eq!(game.countdown(), 30);
        assert_eq!(played(game.audio_link()), vec![2]);
    }

    #[test]
    fn intro_stage_delays_the_countdown() {
        let config = GameConfig::DEFAULT.with_intro(1, Millis::from_ticks(3_000));
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(config, &ticks, Frames::default(), Shown::default());

        assert!(game.start_edge(at(0)));
        assert_eq!(game.state(), GameState::Priming);
        assert_eq!(game.countdown(), 30);
        assert!(!ticks.is_active());

        // ticks during the intro do nothing
        ticks.on_tick();
        assert_eq!(game.countdown(), 30);

        assert_eq!(game.poll(at(2_999), &[false]).entered, None);
        assert_eq!(game.poll(at(3_000), &[false]).entered, Some(GameState::Counting));
        assert!(ticks.is_active());
        assert_eq!(played(game.audio_link()), vec![1, 2]);
    }

    #[test]
    fn sensors_are_ignored_outside_counting() {
        let config = GameConfig::DEFAULT.with_intro(1, Millis::from_ticks(1_000));
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(config, &ticks, Frames::default(), Shown::default());

        assert_eq!(game.poll(at(0), &[true]).goal, None);
        game.start_edge(at(10));
        assert_eq!(game.poll(at(20), &[true]).goal, None);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn goal_scores_and_plays_goal_track() {
        let ticks = TickSource::new();
        let mut game: Game<_, _, 3> =
            Game::new(GameConfig::DEFAULT, &ticks, Frames::default(), Shown::default());
        game.start_edge(at(0));

        let report = game.poll(at(100), &[false, true, false]);
        assert_eq!(report.goal, Some(Goal { sensor: 1, score: 1 }));
        assert_eq!(game.score(), 1);
        assert_eq!(played(game.audio_link()), vec![2, 3]);
        assert_eq!(game.display().0.last().map(|s| s.score), Some(1));
    }

    #[test]
    fn start_edges_mid_round_are_ignored() {
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(GameConfig::DEFAULT, &ticks, Frames::default(), Shown::default());
        game.start_edge(at(0));
        game.poll(at(500), &[true]);
        ticks.on_tick();

        assert!(!game.start_edge(at(5_000)));
        assert_eq!(game.state(), GameState::Counting);
        assert_eq!(game.score(), 1);
        assert_eq!(game.countdown(), 29);
    }

    #[test]
    fn round_over_track_plays_once() {
        let config = GameConfig::DEFAULT.with_round_secs(1);
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(config, &ticks, Frames::default(), Shown::default());
        game.start_edge(at(0));

        ticks.on_tick();
        let report = game.poll(at(1_000), &[false]);
        assert_eq!(report.entered, Some(GameState::Finished));

        // stray ticks and polls while Finished
        ticks.on_tick();
        game.poll(at(1_100), &[false]);
        game.poll(at(1_200), &[true]);

        assert_eq!(played(game.audio_link()), vec![2, 4]);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn finish_hold_returns_to_idle_and_clears_round() {
        let config = GameConfig::DEFAULT.with_round_secs(2);
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(config, &ticks, Frames::default(), Shown::default());
        game.start_edge(at(0));
        game.poll(at(10), &[true]);
        ticks.on_tick();
        ticks.on_tick();
        game.poll(at(2_000), &[false]);
        assert_eq!(game.state(), GameState::Finished);
        assert_eq!(game.score(), 1);

        assert_eq!(game.poll(at(6_999), &[false]).entered, None);
        assert_eq!(game.poll(at(7_000), &[false]).entered, Some(GameState::Idle));
        assert_eq!(game.score(), 0);
        assert_eq!(game.countdown(), 2);
    }

    #[test]
    fn countdown_change_is_published() {
        let ticks = TickSource::new();
        let mut game: Game<_, _, 1> =
            Game::new(GameConfig::DEFAULT, &ticks, Frames::default(), Shown::default());
        game.start_edge(at(0));
        assert_eq!(game.poll(at(10), &[false]).countdown, None);

        ticks.on_tick();
        assert_eq!(game.poll(at(1_000), &[false]).countdown, Some(29));
        assert_eq!(game.display().0.last().map(|s| s.countdown), Some(29));
        assert_eq!(game.poll(at(1_010), &[false]).countdown, None);
    }
}
