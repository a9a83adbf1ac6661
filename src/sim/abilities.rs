//! Energy-funded special abilities
//!
//! Every activation is a no-op unless the session is running and the
//! energy meter covers the cost.

use super::state::{AbilityKind, GameEvent, GameState, MonsterKind};
use super::timers::Modifier;
use super::{boss, combo};
use crate::audio::Cue;
use crate::fx::{FxEvent, colors};

/// Slow monsters and projectiles for the ability duration
pub fn activate_time_freeze(state: &mut GameState) -> bool {
    let ability = state.tuning.time_freeze;
    if !pay(state, ability.cost) {
        return false;
    }
    let now = state.now();
    state
        .session
        .modifiers
        .activate(Modifier::TimeFrozen, now, ability.duration_ms);
    announce(state, AbilityKind::TimeFreeze, ability.duration_ms);
    true
}

/// Block projectile damage for the ability duration
pub fn activate_shield(state: &mut GameState) -> bool {
    let ability = state.tuning.shield;
    if !pay(state, ability.cost) {
        return false;
    }
    let now = state.now();
    state
        .session
        .modifiers
        .activate(Modifier::ShieldActive, now, ability.duration_ms);
    let center = state.field.center();
    let radius = state.field.width.min(state.field.height) / 2.0;
    state.effect(FxEvent::Shield {
        pos: center,
        radius,
    });
    announce(state, AbilityKind::Shield, ability.duration_ms);
    true
}

/// Destroy every regular monster, damage bosses and clear hostile
/// projectiles.
///
/// Wave kills are worth flat points: no combo, no energy, no bonus drops and
/// no splitting.
pub fn activate_explosive_wave(state: &mut GameState) -> bool {
    let ability = state.tuning.explosive_wave;
    if !pay(state, ability.cost) {
        return false;
    }

    let boss_damage = state.tuning.explosive_wave_boss_damage;
    let mut points = 0;
    let mut destroyed = 0;
    for i in (0..state.monsters.len()).rev() {
        let monster = &mut state.monsters[i];
        if let MonsterKind::Boss(_) = monster.kind {
            monster.health = monster.health.saturating_sub(boss_damage);
            if monster.health > 0 {
                continue;
            }
            let mut monster = state.monsters.remove(i);
            points += state.tuning.boss_points;
            boss::defeat(state, &mut monster);
        } else {
            let monster = state.monsters.remove(i);
            points += state.tuning.regular_points;
            state.effect(FxEvent::Explosion {
                pos: monster.pos,
                color: monster.kind.color(),
                count: 20,
                enhanced: true,
            });
        }
        destroyed += 1;
    }

    let before = state.projectiles.len();
    state.projectiles.retain(|p| p.is_bonus());
    let cleared = before - state.projectiles.len();

    state.add_score(points);
    let center = state.field.center();
    state.effect(FxEvent::Explosion {
        pos: center,
        color: colors::PROJECTILE,
        count: 60,
        enhanced: true,
    });
    state.cue(Cue::Explosion);
    log::debug!(
        "Explosive wave: {} monsters destroyed, {} projectiles cleared, {} points",
        destroyed,
        cleared,
        points
    );
    announce(state, AbilityKind::ExplosiveWave, ability.duration_ms);
    true
}

/// Dispatch by kind
pub fn activate(state: &mut GameState, ability: AbilityKind) -> bool {
    match ability {
        AbilityKind::TimeFreeze => activate_time_freeze(state),
        AbilityKind::ExplosiveWave => activate_explosive_wave(state),
        AbilityKind::Shield => activate_shield(state),
    }
}

fn pay(state: &mut GameState, cost: u32) -> bool {
    state.is_running() && combo::spend_energy(state, cost)
}

fn announce(state: &mut GameState, ability: AbilityKind, duration_ms: f64) {
    log::info!(
        "Ability {} activated for {:.1}s",
        ability.as_str(),
        duration_ms / 1000.0
    );
    state.emit(GameEvent::SpecialAbilityActivated {
        ability,
        duration_secs: (duration_ms / 1000.0) as f32,
    });
    state.cue(Cue::Ability);
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::Field;
    use crate::sim::entities;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::{BonusKind, Monster, Projectile, SessionPhase};
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

    fn projectile(id: u32, bonus: Option<BonusKind>) -> Projectile {
        Projectile {
            id,
            pos: Vec2::new(100.0, 300.0),
            vel: Vec2::new(0.0, 3.0),
            size: 16.0,
            from_boss: false,
            special_attack: false,
            bonus,
        }
    }

    fn activations(state: &GameState) -> Vec<(AbilityKind, f32)> {
        state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::SpecialAbilityActivated {
                    ability,
                    duration_secs,
                } => Some((*ability, *duration_secs)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_insufficient_energy_is_noop() {
        let mut state = running_state();
        state.session.energy = 49;
        assert!(!activate_time_freeze(&mut state));
        assert!(!activate_shield(&mut state));
        assert!(!activate_explosive_wave(&mut state));
        assert_eq!(state.session.energy, 49);
        assert!(state.events.is_empty());
        assert!(state.fx.is_empty());
    }

    #[test]
    fn test_requires_running_session() {
        let mut state = running_state();
        state.session.energy = 100;
        state.session.phase = SessionPhase::Paused;
        assert!(!activate(&mut state, AbilityKind::TimeFreeze));
        assert_eq!(state.session.energy, 100);
    }

    #[test]
    fn test_time_freeze() {
        let mut state = running_state();
        state.session.energy = 60;
        state.session.elapsed_ms = 1000.0;
        assert!(activate_time_freeze(&mut state));
        assert_eq!(state.session.energy, 10);
        assert_eq!(
            state.session.modifiers.expires_at(Modifier::TimeFrozen),
            Some(6000.0)
        );
        assert_eq!(activations(&state), vec![(AbilityKind::TimeFreeze, 5.0)]);
        assert!(state.fx.contains(&FxEvent::Cue(Cue::Ability)));
    }

    #[test]
    fn test_shield_ability() {
        let mut state = running_state();
        state.session.energy = 60;
        assert!(activate_shield(&mut state));
        assert_eq!(state.session.energy, 0);
        assert!(state.is_active(Modifier::ShieldActive));
        assert_eq!(activations(&state), vec![(AbilityKind::Shield, 5.0)]);
    }

    #[test]
    fn test_explosive_wave() {
        let mut state = running_state();
        state.session.energy = 80;
        for _ in 0..3 {
            entities::spawn_regular_monster(&mut state);
        }
        entities::spawn_boss_monster(&mut state);
        state.projectiles.push(projectile(100, None));
        state.projectiles.push(projectile(101, Some(BonusKind::Energy)));
        state.projectiles.push(projectile(102, None));
        state.events.clear();

        assert!(activate_explosive_wave(&mut state));
        assert_eq!(state.session.energy, 5);
        assert_eq!(state.session.score, 3);
        assert_eq!(state.monsters.len(), 1);
        assert_eq!(state.monsters[0].health, 8);
        assert_eq!(state.projectiles.len(), 1);
        assert!(state.projectiles[0].is_bonus());
        assert_eq!(state.session.combo_count, 0);
        assert_eq!(activations(&state), vec![(AbilityKind::ExplosiveWave, 0.0)]);
    }

    #[test]
    fn test_explosive_wave_finishes_weak_boss() {
        let mut state = running_state();
        state.session.energy = 100;
        entities::spawn_boss_monster(&mut state);
        state.monsters[0].health = 2;

        assert!(activate_explosive_wave(&mut state));
        assert!(state.monsters.is_empty());
        assert_eq!(state.session.score, 20);
        assert_eq!(state.session.schedule.len(), 5);
        assert_eq!(state.session.energy, 25);
    }

    #[test]
    fn test_wave_kills_do_not_split() {
        let mut state = running_state();
        state.session.energy = 75;
        state.monsters.push(Monster {
            id: 1,
            pos: Vec2::new(200.0, 100.0),
            size: Vec2::splat(60.0),
            health: 1,
            kind: MonsterKind::Splitter {
                split_count: 3,
                split_size: 36.0,
            },
            spawned_at: 0.0,
            launch_in_ms: 4000.0,
            has_fired: false,
        });
        assert!(activate_explosive_wave(&mut state));
        assert!(state.monsters.is_empty());
        assert_eq!(state.session.score, 1);
    }
}
