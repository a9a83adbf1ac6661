//! Fixed timestep simulation tick
//!
//! Advances the session clock and runs every subsystem in a fixed order:
//! timers, difficulty, spawning, bosses, launches, projectile motion, then
//! queued taps.

use glam::Vec2;

use super::state::GameState;
use super::timers::{DelayedEffect, Modifier};
use super::{abilities, boss, collision, combo, difficulty, entities, projectile};
use crate::audio::Cue;
use crate::fx::FxEvent;

/// Ticks between autoplay taps (about 3 taps per second)
const AUTOPLAY_TAP_PERIOD: u64 = 20;

/// A pointer contact queued for the next tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub pos: Vec2,
    /// Session time of the contact; `None` means "this tick"
    pub at_ms: Option<f64>,
}

impl Tap {
    pub fn new(pos: Vec2) -> Self {
        Self { pos, at_ms: None }
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Contacts in event order
    pub taps: Vec<Tap>,
    /// Demo mode - a simple bot plays the game
    pub autoplay: bool,
}

/// Advance the game state by one fixed timestep of `dt_ms`
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    if !state.is_running() {
        return;
    }

    state.session.elapsed_ms += dt_ms;
    state.session.ticks += 1;
    let now = state.now();

    // === Timers ===
    for modifier in state.session.modifiers.expire_due(now) {
        log::debug!("{} expired at {:.0}ms", modifier.as_str(), now);
    }
    for effect in state.session.schedule.take_due(now) {
        match effect {
            DelayedEffect::DefeatBurst {
                pos,
                color,
                count,
                enhanced,
            } => {
                state.effect(FxEvent::Explosion {
                    pos,
                    color,
                    count,
                    enhanced,
                });
                state.cue(Cue::Explosion);
            }
        }
    }

    // === World update ===
    difficulty::update(state);
    entities::spawn_if_due(state);
    boss::update(state, dt_ms);
    projectile::launch_due(state, dt_ms);
    projectile::update(state);
    if !state.is_running() {
        return;
    }

    // === Input ===
    for tap in &input.taps {
        collision::resolve_tap(state, tap.pos, tap.at_ms.unwrap_or(now));
    }
    if input.autoplay {
        autoplay(state);
    }

    combo::decay(state);
}

/// Demo bot: periodically taps the most urgent target and spends energy
/// when the field gets crowded
fn autoplay(state: &mut GameState) {
    let crowded = state.monsters.iter().filter(|m| !m.is_boss()).count() >= 4;
    if crowded && abilities::activate_explosive_wave(state) {
        return;
    }
    let hostile = state.projectiles.iter().filter(|p| !p.is_bonus()).count();
    if hostile >= 3 && !state.is_active(Modifier::ShieldActive) {
        abilities::activate_shield(state);
    }

    if state.session.ticks % AUTOPLAY_TAP_PERIOD != 0 {
        return;
    }
    if let Some(target) = autoplay_target(state) {
        let now = state.now();
        collision::resolve_tap(state, target, now);
    }
}

/// Lowest hostile projectile first, then the monster closest to firing
pub fn autoplay_target(state: &GameState) -> Option<Vec2> {
    let projectile = state
        .projectiles
        .iter()
        .filter(|p| !p.is_bonus())
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|p| p.pos);
    if projectile.is_some() {
        return projectile;
    }

    state
        .monsters
        .iter()
        .filter(|m| !m.has_fired)
        .min_by(|a, b| a.launch_in_ms.total_cmp(&b.launch_in_ms))
        .or_else(|| state.monsters.iter().find(|m| m.is_boss()))
        .map(|m| m.pos)
        .or_else(|| state.projectiles.iter().find(|p| p.is_bonus()).map(|p| p.pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use crate::sim::rng::{PcgRandom, ScriptedRandom};
    use crate::sim::state::{GameEvent, Projectile, SessionPhase};
    use crate::tuning::Tuning;

    fn running_state() -> GameState {
        let mut state = GameState::new(
            Field::default(),
            Tuning::default(),
            Box::new(ScriptedRandom::new([])),
        );
        state.begin_session();
        state.events.clear();
        state
    }

    fn run(state: &mut GameState, ticks: u32, dt_ms: f64) {
        let input = TickInput::default();
        for _ in 0..ticks {
            tick(state, &input, dt_ms);
        }
    }

    #[test]
    fn test_paused_session_does_not_advance() {
        let mut state = running_state();
        run(&mut state, 10, 100.0);
        assert_eq!(state.now(), 1000.0);

        state.session.phase = SessionPhase::Paused;
        run(&mut state, 50, 100.0);
        assert_eq!(state.now(), 1000.0);
        assert!(state.monsters.is_empty());

        state.session.phase = SessionPhase::Running;
        run(&mut state, 10, 100.0);
        assert_eq!(state.now(), 2000.0);
        assert_eq!(state.monsters.len(), 1);
    }

    #[test]
    fn test_waves_follow_interval() {
        let mut state = running_state();
        run(&mut state, 19, 100.0);
        assert!(state.monsters.is_empty());
        run(&mut state, 1, 100.0);
        assert_eq!(state.monsters.len(), 1);
        run(&mut state, 20, 100.0);
        assert_eq!(state.monsters.len(), 2);
    }

    #[test]
    fn test_unfired_monster_launches_and_leaves() {
        let mut state = running_state();
        run(&mut state, 20, 100.0);
        assert_eq!(state.monsters.len(), 1);
        let id = state.monsters[0].id;

        // Level 0 launch countdown is 4s
        run(&mut state, 40, 100.0);
        assert!(state.monster_index(id).is_none());
        assert!(state.projectiles.iter().any(|p| !p.is_bonus()));
    }

    #[test]
    fn test_difficulty_event_fires_once() {
        let mut state = running_state();
        state
            .session
            .modifiers
            .activate(Modifier::ShieldActive, 0.0, 1e9);
        run(&mut state, 301, 100.0);
        let raised: Vec<_> = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::DifficultyIncreased { .. }))
            .collect();
        assert_eq!(
            raised,
            vec![&GameEvent::DifficultyIncreased {
                level: 1,
                monsters_per_wave: 2
            }]
        );
    }

    #[test]
    fn test_game_over_freezes_session() {
        let mut state = running_state();
        state.set_lives(1);
        state.events.clear();
        state.projectiles.push(Projectile {
            id: 99,
            pos: Vec2::new(400.0, 607.0),
            vel: Vec2::new(0.0, 3.0),
            size: 16.0,
            from_boss: false,
            special_attack: false,
            bonus: None,
        });

        run(&mut state, 1, 100.0);
        assert_eq!(state.session.lives, 0);
        assert_eq!(state.session.phase, SessionPhase::GameOver);
        let game_overs = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::GameOver)
            .count();
        assert_eq!(game_overs, 1);

        let (score, elapsed) = (state.session.score, state.now());
        let input = TickInput {
            taps: vec![Tap::new(Vec2::new(400.0, 100.0))],
            autoplay: true,
        };
        for _ in 0..100 {
            tick(&mut state, &input, 100.0);
        }
        assert_eq!(state.session.score, score);
        assert_eq!(state.session.lives, 0);
        assert_eq!(state.now(), elapsed);
    }

    #[test]
    fn test_modifiers_expire_on_session_clock() {
        let mut state = running_state();
        state
            .session
            .modifiers
            .activate(Modifier::TimeFrozen, 0.0, 5000.0);
        run(&mut state, 49, 100.0);
        assert!(state.is_active(Modifier::TimeFrozen));
        run(&mut state, 1, 100.0);
        assert!(!state.is_active(Modifier::TimeFrozen));
        assert_eq!(state.session.modifiers.expires_at(Modifier::TimeFrozen), None);
    }

    #[test]
    fn test_defeat_bursts_play_out() {
        let mut state = running_state();
        entities::spawn_boss_monster(&mut state);
        let mut boss = state.monsters.remove(0);
        boss::defeat(&mut state, &mut boss);
        state.fx.clear();

        let bursts = |state: &GameState| {
            state
                .fx
                .iter()
                .filter(|f| matches!(f, FxEvent::Explosion { .. }))
                .count()
        };
        run(&mut state, 1, 100.0);
        assert_eq!(bursts(&state), 1);
        run(&mut state, 9, 100.0);
        assert_eq!(bursts(&state), 5);
        assert!(state.session.schedule.is_empty());
    }

    #[test]
    fn test_queued_taps_resolve_in_order() {
        let mut state = running_state();
        run(&mut state, 20, 100.0);
        let pos = state.monsters[0].pos;
        let input = TickInput {
            taps: vec![Tap::new(pos), Tap::new(pos)],
            autoplay: false,
        };
        tick(&mut state, &input, 100.0);
        assert!(state.monsters.is_empty());
        assert_eq!(state.session.score, 1);
        assert_eq!(state.session.combo_count, 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(
            Field::default(),
            Tuning::default(),
            Box::new(PcgRandom::new(99999)),
        );
        let mut b = GameState::new(
            Field::default(),
            Tuning::default(),
            Box::new(PcgRandom::new(99999)),
        );
        a.begin_session();
        b.begin_session();

        let input = TickInput {
            taps: Vec::new(),
            autoplay: true,
        };
        for _ in 0..3000 {
            tick(&mut a, &input, crate::consts::TICK_MS);
            tick(&mut b, &input, crate::consts::TICK_MS);
        }

        assert_eq!(a.session.score, b.session.score);
        assert_eq!(a.session.lives, b.session.lives);
        assert_eq!(a.monsters, b.monsters);
        assert_eq!(a.projectiles, b.projectiles);
        assert_eq!(a.events, b.events);
    }
}
