//! Fixed-interval gravity driver
//!
//! The host feeds wall-clock time into [`TickDriver::advance`], which calls
//! [`Game::tick`] once per elapsed interval. A tick always runs to completion
//! before the next one starts. If the host falls far behind, at most
//! [`MAX_CATCH_UP_TICKS`] ticks run per call and the rest of the backlog is
//! dropped instead of replayed.

use tracing::warn;

use crate::config::GameConfig;
use crate::game::{Game, Outcome};
use crate::types::MAX_CATCH_UP_TICKS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickDriver {
    interval_ms: u32,
    /// Time elapsed since the last tick
    accumulated_ms: u32,
}

impl TickDriver {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            accumulated_ms: 0,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.tick_ms)
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Time banked toward the next tick
    pub fn pending_ms(&self) -> u32 {
        self.accumulated_ms
    }

    /// Call this with the milliseconds elapsed since the previous call
    ///
    /// Returns the outcome of every tick that ran. Paused or ended games
    /// don't bank time.
    pub fn advance(&mut self, game: &mut Game, elapsed_ms: u32) -> Vec<Outcome> {
        if !game.playable() {
            self.accumulated_ms = 0;
            return Vec::new();
        }

        self.accumulated_ms = self.accumulated_ms.saturating_add(elapsed_ms);
        let due = self.accumulated_ms / self.interval_ms;
        self.accumulated_ms %= self.interval_ms;

        if due > MAX_CATCH_UP_TICKS {
            warn!(
                due,
                skipped = due - MAX_CATCH_UP_TICKS,
                "tick backlog dropped"
            );
        }

        let mut outcomes = Vec::new();
        for _ in 0..due.min(MAX_CATCH_UP_TICKS) {
            let outcome = game.tick();
            outcomes.push(outcome);
            if outcome == Outcome::GameOver {
                self.accumulated_ms = 0;
                break;
            }
        }
        outcomes
    }

    /// Drop any banked time
    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
    }
}

impl Default for TickDriver {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
