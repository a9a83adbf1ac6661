//! Projectile spawning, motion and boundary rules

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::combo;
use super::state::{BonusKind, GameEvent, GameState, Projectile, SessionPhase};
use super::timers::Modifier;
use crate::audio::Cue;
use crate::fx::FxEvent;
use crate::{direction_from_down, polar_to_cartesian};

/// Attack patterns shared by monsters and bosses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirePattern {
    /// One shot inside a cone around straight down
    Single,
    /// Three shots at fixed angles
    Triple,
    /// Evenly spaced radial ring
    Circle { count: u32 },
    /// Three parallel columns dropping straight down
    Wave,
}

/// Where a volley comes from and how it flies
#[derive(Debug, Clone, Copy)]
pub struct Volley {
    pub origin: Vec2,
    pub speed: f32,
    pub size: f32,
    pub from_boss: bool,
    pub special_attack: bool,
}

/// Launch one pattern; returns the number of projectiles created
pub fn fire(state: &mut GameState, pattern: FirePattern, volley: Volley) -> usize {
    let mut shots: Vec<(Vec2, Vec2)> = Vec::new();
    match pattern {
        FirePattern::Single => {
            let cone = state.tuning.single_cone_degrees;
            let angle = (state.rng().next_f32() * 2.0 - 1.0) * cone;
            shots.push((volley.origin, direction_from_down(angle)));
        }
        FirePattern::Triple => {
            for angle in state.tuning.triple_angles_degrees {
                shots.push((volley.origin, direction_from_down(angle)));
            }
        }
        FirePattern::Circle { count } => {
            let count = count.max(1);
            for i in 0..count {
                let theta = TAU * i as f32 / count as f32;
                shots.push((volley.origin, polar_to_cartesian(1.0, theta)));
            }
        }
        FirePattern::Wave => {
            let spacing = state.tuning.wave_column_spacing;
            for offset in [-spacing, 0.0, spacing] {
                shots.push((volley.origin + Vec2::new(offset, 0.0), Vec2::Y));
            }
        }
    }

    let count = shots.len();
    for (pos, dir) in shots {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos,
            vel: dir * volley.speed,
            size: volley.size,
            from_boss: volley.from_boss,
            special_attack: volley.special_attack,
            bonus: None,
        });
    }
    state.cue(Cue::Shoot);
    count
}

/// Run launch countdowns for non-boss monsters. A monster whose countdown
/// expires fires one SINGLE shot and leaves the field.
///
/// Returns the number of monsters that launched.
pub fn launch_due(state: &mut GameState, dt_ms: f64) -> usize {
    let step = dt_ms * state.freeze_factor() as f64;
    let speed = state.tuning.projectile_speed;
    let size = state.tuning.projectile_size;
    let mut launched = 0;

    let mut i = state.monsters.len();
    while i > 0 {
        i -= 1;
        let monster = &mut state.monsters[i];
        if monster.is_boss() || monster.has_fired {
            continue;
        }
        monster.launch_in_ms -= step;
        if monster.launch_in_ms > 0.0 {
            continue;
        }
        monster.has_fired = true;
        let origin = monster.pos + Vec2::new(0.0, monster.size.y / 2.0);
        let monster = state.monsters.remove(i);
        log::debug!("Monster {} launched and withdrew", monster.id);

        fire(
            state,
            FirePattern::Single,
            Volley {
                origin,
                speed,
                size,
                from_boss: false,
                special_attack: false,
            },
        );
        launched += 1;
    }
    launched
}

/// Drop a slow-falling bonus at `pos` (draws: kind, drift)
pub fn spawn_bonus(state: &mut GameState, pos: Vec2) -> u32 {
    let kind = BonusKind::ALL[state.rng().next_index(BonusKind::ALL.len())];
    let drift = (state.rng().next_f32() * 2.0 - 1.0) * state.tuning.bonus_max_drift;
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        pos,
        vel: Vec2::new(drift, state.tuning.bonus_fall_speed),
        size: state.tuning.bonus_size,
        from_boss: false,
        special_attack: false,
        bonus: Some(kind),
    });
    log::debug!("Bonus {} dropped at {:?}", kind.as_str(), pos);
    id
}

/// Apply a collected bonus
pub fn apply_bonus(state: &mut GameState, kind: BonusKind, pos: Vec2) {
    let now = state.now();
    match kind {
        BonusKind::Points => {
            let duration = state.tuning.bonus_points_duration_ms;
            state
                .session
                .modifiers
                .activate(Modifier::PointsMultiplierActive, now, duration);
        }
        BonusKind::Life => {
            let lives = state.session.lives.saturating_add(1);
            state.set_lives(lives);
        }
        BonusKind::Slowdown => {
            let duration = state.tuning.bonus_slowdown_duration_ms;
            state
                .session
                .modifiers
                .activate(Modifier::SlowdownActive, now, duration);
        }
        BonusKind::Shield => {
            let duration = state.tuning.bonus_shield_duration_ms;
            state
                .session
                .modifiers
                .activate(Modifier::ShieldActive, now, duration);
        }
        BonusKind::Energy => {
            let amount = state.tuning.bonus_energy;
            combo::add_energy(state, amount);
        }
    }
    state.effect(FxEvent::Bonus { pos, kind });
    state.cue(Cue::Bonus);
    state.emit(GameEvent::BonusCollected(kind));
    log::debug!("Bonus {} collected", kind.as_str());
}

/// Advance every projectile one tick and resolve boundary exits.
///
/// Returns the number of lives lost this tick.
pub fn update(state: &mut GameState) -> u32 {
    let factor = state.slowdown_factor() * state.freeze_factor();
    for p in &mut state.projectiles {
        p.pos += p.vel * factor;
    }

    let field = state.field;
    let shielded = state.is_active(Modifier::ShieldActive);
    let mut lives_lost = 0;

    let mut i = state.projectiles.len();
    while i > 0 {
        i -= 1;
        let p = &state.projectiles[i];
        if !field.is_outside(p.pos, p.size / 2.0) {
            continue;
        }
        let p = state.projectiles.remove(i);

        if p.is_bonus() {
            continue;
        }
        if shielded {
            let exit = p.pos.clamp(Vec2::ZERO, Vec2::new(field.width, field.height));
            state.effect(FxEvent::Shield {
                pos: exit,
                radius: p.size * 2.0,
            });
            state.cue(Cue::ShieldAbsorb);
            continue;
        }

        lives_lost += 1;
        let lives = state.session.lives.saturating_sub(1);
        state.set_lives(lives);
        state.cue(Cue::LifeLost);
        if lives == 0 {
            game_over(state);
            break;
        }
    }
    lives_lost
}

/// Remove every live projectile (boss defeat)
pub fn clear_all(state: &mut GameState) -> usize {
    let n = state.projectiles.len();
    state.projectiles.clear();
    n
}

fn game_over(state: &mut GameState) {
    if state.session.phase == SessionPhase::GameOver {
        return;
    }
    state.session.phase = SessionPhase::GameOver;
    log::info!(
        "Game over at {:.0}ms with score {}",
        state.now(),
        state.session.score
    );
    state.emit(GameEvent::GameOver);
    state.cue(Cue::GameOver);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use crate::sim::rng::ScriptedRandom;
    use crate::tuning::Tuning;

    fn running_state(values: &[f32]) -> GameState {
        let mut state = GameState::new(
            Field::new(800.0, 600.0),
            Tuning::default(),
            Box::new(ScriptedRandom::new(values.to_vec())),
        );
        state.begin_session();
        state.events.clear();
        state
    }

    fn volley(origin: Vec2) -> Volley {
        Volley {
            origin,
            speed: 3.0,
            size: 16.0,
            from_boss: false,
            special_attack: false,
        }
    }

    fn projectile_at(state: &mut GameState, pos: Vec2, vel: Vec2) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            pos,
            vel,
            size: 16.0,
            from_boss: false,
            special_attack: false,
            bonus: None,
        });
    }

    #[test]
    fn test_single_cone() {
        let mut state = running_state(&[0.0, 1.0, 0.5]);
        for _ in 0..3 {
            fire(&mut state, FirePattern::Single, volley(Vec2::ZERO));
        }
        let angles: Vec<f32> = state
            .projectiles
            .iter()
            .map(|p| p.vel.x.atan2(p.vel.y).to_degrees())
            .collect();
        assert!((angles[0] + 30.0).abs() < 1e-3);
        assert!((angles[1] - 30.0).abs() < 1e-3);
        assert!(angles[2].abs() < 1e-3);
        for p in &state.projectiles {
            assert!((p.vel.length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_triple_angles() {
        let mut state = running_state(&[]);
        assert_eq!(fire(&mut state, FirePattern::Triple, volley(Vec2::ZERO)), 3);
        let angles: Vec<f32> = state
            .projectiles
            .iter()
            .map(|p| p.vel.x.atan2(p.vel.y).to_degrees().round())
            .collect();
        assert_eq!(angles, vec![-20.0, 0.0, 20.0]);
    }

    #[test]
    fn test_circle_even_spacing() {
        let mut state = running_state(&[]);
        assert_eq!(
            fire(
                &mut state,
                FirePattern::Circle { count: 6 },
                volley(Vec2::ZERO)
            ),
            6
        );
        let sum: Vec2 = state.projectiles.iter().map(|p| p.vel).sum();
        assert!(sum.length() < 1e-4);
    }

    #[test]
    fn test_wave_columns() {
        let mut state = running_state(&[]);
        fire(&mut state, FirePattern::Wave, volley(Vec2::new(100.0, 50.0)));
        let xs: Vec<f32> = state.projectiles.iter().map(|p| p.pos.x).collect();
        assert_eq!(xs, vec![60.0, 100.0, 140.0]);
        assert!(state.projectiles.iter().all(|p| p.vel == Vec2::new(0.0, 3.0)));
    }

    #[test]
    fn test_launch_countdown_removes_monster() {
        use crate::sim::state::{Monster, MonsterKind};

        let mut state = running_state(&[]);
        state.monsters.push(Monster {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            size: Vec2::splat(60.0),
            health: 1,
            kind: MonsterKind::Regular,
            spawned_at: 0.0,
            launch_in_ms: 1000.0,
            has_fired: false,
        });

        assert_eq!(launch_due(&mut state, 999.0), 0);
        assert_eq!(state.monsters.len(), 1);

        // Frozen countdowns run at a fifth of the speed
        state
            .session
            .modifiers
            .activate(Modifier::TimeFrozen, 0.0, 5000.0);
        assert_eq!(launch_due(&mut state, 4.0), 0);
        assert_eq!(launch_due(&mut state, 1.0), 1);

        assert!(state.monsters.is_empty());
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].pos, Vec2::new(100.0, 130.0));
        assert!(!state.projectiles[0].from_boss);
    }

    #[test]
    fn test_motion_factors() {
        let mut state = running_state(&[]);
        projectile_at(&mut state, Vec2::new(100.0, 100.0), Vec2::new(0.0, 10.0));

        update(&mut state);
        assert_eq!(state.projectiles[0].pos.y, 110.0);

        state
            .session
            .modifiers
            .activate(Modifier::SlowdownActive, 0.0, 5000.0);
        update(&mut state);
        assert_eq!(state.projectiles[0].pos.y, 115.0);

        state
            .session
            .modifiers
            .activate(Modifier::TimeFrozen, 0.0, 5000.0);
        update(&mut state);
        assert!((state.projectiles[0].pos.y - 116.0).abs() < 1e-4);
    }

    #[test]
    fn test_exit_costs_life_and_game_over_once() {
        let mut state = running_state(&[]);
        state.session.lives = 1;
        projectile_at(&mut state, Vec2::new(100.0, 605.0), Vec2::new(0.0, 10.0));
        projectile_at(&mut state, Vec2::new(200.0, 605.0), Vec2::new(0.0, 10.0));

        assert_eq!(update(&mut state), 1);
        assert_eq!(state.session.lives, 0);
        assert_eq!(state.session.phase, SessionPhase::GameOver);
        let game_overs = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::GameOver)
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_shield_absorbs_exit() {
        let mut state = running_state(&[]);
        state
            .session
            .modifiers
            .activate(Modifier::ShieldActive, 0.0, 5000.0);
        projectile_at(&mut state, Vec2::new(100.0, 605.0), Vec2::new(0.0, 10.0));

        assert_eq!(update(&mut state), 0);
        assert_eq!(state.session.lives, 3);
        assert!(state.projectiles.is_empty());
        assert!(state.fx.contains(&FxEvent::Cue(Cue::ShieldAbsorb)));
    }

    #[test]
    fn test_bonus_exit_is_silent() {
        let mut state = running_state(&[0.0, 0.5]);
        spawn_bonus(&mut state, Vec2::new(100.0, 620.0));
        assert_eq!(state.projectiles[0].bonus, Some(BonusKind::Points));

        assert_eq!(update(&mut state), 0);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.session.lives, 3);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_bonus_effects() {
        let mut state = running_state(&[]);
        let pos = Vec2::new(10.0, 10.0);

        apply_bonus(&mut state, BonusKind::Points, pos);
        assert!(state.is_active(Modifier::PointsMultiplierActive));
        assert_eq!(
            state
                .session
                .modifiers
                .expires_at(Modifier::PointsMultiplierActive),
            Some(10_000.0)
        );

        state.session.lives = 5;
        apply_bonus(&mut state, BonusKind::Life, pos);
        assert_eq!(state.session.lives, 5);
        state.session.lives = 2;
        apply_bonus(&mut state, BonusKind::Life, pos);
        assert_eq!(state.session.lives, 3);

        apply_bonus(&mut state, BonusKind::Slowdown, pos);
        assert_eq!(state.slowdown_factor(), 0.5);

        apply_bonus(&mut state, BonusKind::Shield, pos);
        assert!(state.is_active(Modifier::ShieldActive));

        apply_bonus(&mut state, BonusKind::Energy, pos);
        assert_eq!(state.session.energy, 25);

        let collected = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BonusCollected(_)))
            .count();
        assert_eq!(collected, 6);
    }
}
