//! What the display and log sink gets told.

use crate::game::GameState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub state: GameState,
    pub countdown: u32,
    pub score: u32,
}

/// Receives a snapshot on every state change and every countdown decrement.
pub trait DisplayNotifier {
    fn show(&mut self, snapshot: Snapshot);
}

impl<D: DisplayNotifier + ?Sized> DisplayNotifier for &mut D {
    fn show(&mut self, snapshot: Snapshot) {
        (**self).show(snapshot)
    }
}

/// A number as a display with a fixed digit count can show it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readout {
    Value(u32),
    /// Too many digits; show the overflow symbol instead.
    Overflow,
}

impl Readout {
    pub fn of(value: u32, digits: u32) -> Self {
        match 10u32.checked_pow(digits) {
            Some(limit) if value >= limit => Readout::Overflow,
            _ => Readout::Value(value),
        }
    }
}
