//! Difficulty ramp driven by session time

use super::state::{GameEvent, GameState};
use crate::audio::Cue;
use crate::tuning::Tuning;

/// Level a session should be at after `elapsed_ms`, ignoring transition rules
pub fn level_for_elapsed(tuning: &Tuning, elapsed_ms: f64) -> u32 {
    tuning
        .difficulty_levels
        .iter()
        .rposition(|l| elapsed_ms >= l.threshold_ms)
        .unwrap_or(0) as u32
}

/// Advance at most one level per call when the next breakpoint is crossed.
///
/// Returns the new level on a transition. The level never decreases.
pub fn update(state: &mut GameState) -> Option<u32> {
    let current = state.session.difficulty_level;
    if current >= state.tuning.max_level() {
        return None;
    }

    let next = current + 1;
    let row = state.tuning.level(next);
    if state.now() < row.threshold_ms {
        return None;
    }

    state.session.difficulty_level = next;
    log::info!(
        "Difficulty {} -> {} at {:.0}ms (interval {:.1}s, {} per wave)",
        current,
        next,
        state.now(),
        row.projectile_interval_ms / 1000.0,
        row.monsters_per_wave
    );
    state.emit(GameEvent::DifficultyIncreased {
        level: next,
        monsters_per_wave: row.monsters_per_wave,
    });
    state.cue(Cue::LevelUp);
    Some(next)
}
