//! Best score across sessions
//!
//! A single scalar; the host decides where to persist it.

use serde::{Deserialize, Serialize};

/// Best score seen so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// Storage key the host should persist under
    pub const STORAGE_KEY: &'static str = "tap_siege_highscore";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Check if a score would beat the current best
    pub fn qualifies(&self, score: u64) -> bool {
        score > self.best
    }

    /// Record a finished session; returns true on a new best
    pub fn record(&mut self, score: u64) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        log::info!("New high score {} (was {})", score, self.best);
        self.best = score;
        true
    }
}
