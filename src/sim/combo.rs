//! Combo streak, score multiplier and energy meter

use super::state::{GameEvent, GameState};
use super::timers::Modifier;
use crate::tuning::Tuning;

/// `min(max, 1 + floor(count / step))`
pub fn combo_multiplier(tuning: &Tuning, count: u32) -> u32 {
    (1 + count / tuning.combo_step).min(tuning.max_combo_multiplier)
}

/// Extend or restart the streak for a kill at `now`; returns the new multiplier
pub fn register_kill(state: &mut GameState, now: f64) -> u32 {
    let timeout = state.tuning.combo_timeout_ms;
    let session = &mut state.session;
    let within_window = session
        .last_kill_at
        .is_some_and(|last| now - last < timeout);

    session.combo_count = if within_window {
        session.combo_count + 1
    } else {
        1
    };
    session.combo_multiplier = combo_multiplier(&state.tuning, session.combo_count);
    session.last_kill_at = Some(now);

    let (count, multiplier) = (session.combo_count, session.combo_multiplier);
    state.emit(GameEvent::ComboChanged { count, multiplier });
    multiplier
}

/// Points for a kill worth `base`, after combo and the double-points bonus
pub fn kill_points(state: &GameState, base: u64) -> u64 {
    let bonus = if state.is_active(Modifier::PointsMultiplierActive) {
        state.tuning.bonus_points_factor
    } else {
        1
    };
    base * state.session.combo_multiplier as u64 * bonus
}

/// Drop a stale streak once the combo window has passed
pub fn decay(state: &mut GameState) {
    if state.session.combo_count == 0 {
        return;
    }
    let now = state.now();
    let timeout = state.tuning.combo_timeout_ms;
    let expired = state
        .session
        .last_kill_at
        .is_none_or(|last| now - last > timeout);
    if expired {
        let session = &mut state.session;
        session.combo_count = 0;
        session.combo_multiplier = 1;
        state.emit(GameEvent::ComboChanged {
            count: 0,
            multiplier: 1,
        });
    }
}

/// Add energy, clamped to the meter size
pub fn add_energy(state: &mut GameState, amount: u32) {
    let max = state.tuning.max_energy;
    let energy = (state.session.energy + amount).min(max);
    set_energy(state, energy);
}

/// Deduct `cost` if affordable; otherwise leave everything untouched
pub fn spend_energy(state: &mut GameState, cost: u32) -> bool {
    if state.session.energy < cost {
        return false;
    }
    let energy = state.session.energy - cost;
    set_energy(state, energy);
    true
}

fn set_energy(state: &mut GameState, energy: u32) {
    let energy = energy.min(state.tuning.max_energy);
    if energy == state.session.energy {
        return;
    }
    state.session.energy = energy;
    let max_energy = state.tuning.max_energy;
    state.emit(GameEvent::EnergyChanged { energy, max_energy });
}
