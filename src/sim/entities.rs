//! Monster creation and wave scheduling
//!
//! Random draws happen in a fixed order per spawn so scripted sources can
//! force exact results:
//! - regular spawn: kind roll, variant roll (shielded/splitter only), x, y
//! - boss spawn: direction x, direction y
//! - split child: x offset, y offset

use glam::Vec2;

use super::state::{Boss, BossKind, BossPhase, GameState, Monster, MonsterKind};
use crate::audio::Cue;
use crate::fx::FxEvent;

/// Spawn one non-boss monster in the upper third of the field
pub fn spawn_regular_monster(state: &mut GameState) -> u32 {
    let tuning = &state.tuning;
    let size = tuning.monster_size;
    let (regular_chance, shielded_chance) = (tuning.regular_chance, tuning.shielded_chance);
    let (shield_min, shield_spread) = (tuning.shield_health_min, tuning.shield_health_spread);
    let (split_min, split_spread) = (tuning.split_count_min, tuning.split_count_spread);
    let split_size = size * tuning.split_size_factor;

    let roll = state.rng().next_f32();
    let kind = if roll < regular_chance {
        MonsterKind::Regular
    } else if roll < regular_chance + shielded_chance {
        MonsterKind::Shielded {
            shield: state.rng().next_spread(shield_min, shield_spread),
        }
    } else {
        MonsterKind::Splitter {
            split_count: state.rng().next_spread(split_min, split_spread),
            split_size,
        }
    };

    let field = state.field;
    let half = size / 2.0;
    let x = half + state.rng().next_f32() * (field.width - size).max(0.0);
    let y = half + state.rng().next_f32() * (field.height / 3.0 - half).max(0.0);

    let monster = new_monster(state, kind, Vec2::new(x, y), Vec2::splat(size));
    push_monster(state, monster)
}

/// Spawn the next boss in the cyclic sequence at top-center
pub fn spawn_boss_monster(state: &mut GameState) -> u32 {
    let kind = BossKind::from_sequence(state.session.boss_index);
    let level = state.session.difficulty_level;
    let tuning = &state.tuning;
    let health = tuning.boss_base_health + tuning.boss_health_per_level * level;
    let speed = tuning.boss_speed_base + tuning.boss_speed_per_level * level as f32;
    let size = Vec2::splat(tuning.boss_size);

    let dx = state.rng().next_f32() - 0.5;
    let dy = state.rng().next_f32() - 0.5;
    let dir = Vec2::new(dx, dy).try_normalize().unwrap_or(Vec2::X);

    let pos = Vec2::new(state.field.width / 2.0, state.field.height / 4.0);
    let mut monster = new_monster(
        state,
        MonsterKind::Boss(Boss {
            kind,
            phase: BossPhase::Spawning,
            dir,
            speed,
            last_fire_at: None,
        }),
        pos,
        size,
    );
    monster.health = health;
    let id = monster.id;

    state.session.boss_index += 1;
    log::info!(
        "Boss {} spawned (health {}, speed {:.2})",
        kind.as_str(),
        health,
        speed
    );
    // Spawn effect and host callback come from the boss's Spawning state
    state.monsters.push(monster);
    id
}

/// Replace a dead splitter with its regular children
pub fn split_monster(state: &mut GameState, parent: &Monster) -> Vec<u32> {
    let MonsterKind::Splitter {
        split_count,
        split_size,
    } = parent.kind
    else {
        return Vec::new();
    };

    let mut children = Vec::with_capacity(split_count as usize);
    for _ in 0..split_count {
        let ox = (state.rng().next_f32() - 0.5) * parent.size.x;
        let oy = (state.rng().next_f32() - 0.5) * parent.size.y;
        let child = new_monster(
            state,
            MonsterKind::Regular,
            parent.pos + Vec2::new(ox, oy),
            Vec2::splat(split_size),
        );
        children.push(push_monster(state, child));
    }
    log::debug!("Splitter {} split into {} children", parent.id, split_count);
    children
}

/// Spawn a wave and/or boss when their intervals have elapsed
pub fn spawn_if_due(state: &mut GameState) {
    let now = state.now();

    if now - state.session.last_wave_at >= state.tuning.wave_interval_ms {
        state.session.last_wave_at = now;
        let count = state
            .tuning
            .level(state.session.difficulty_level)
            .monsters_per_wave;
        for _ in 0..count {
            spawn_regular_monster(state);
        }
    }

    if now - state.session.last_boss_at >= state.tuning.boss_interval_ms {
        state.session.last_boss_at = now;
        if state.live_boss().is_some() {
            log::debug!("Boss still alive at {:.0}ms, skipping boss spawn", now);
        } else {
            spawn_boss_monster(state);
        }
    }
}

fn new_monster(state: &mut GameState, kind: MonsterKind, pos: Vec2, size: Vec2) -> Monster {
    let launch_in_ms = state
        .tuning
        .level(state.session.difficulty_level)
        .projectile_interval_ms;
    Monster {
        id: state.next_entity_id(),
        pos,
        size,
        health: 1,
        kind,
        spawned_at: state.now(),
        launch_in_ms,
        has_fired: false,
    }
}

fn push_monster(state: &mut GameState, monster: Monster) -> u32 {
    let id = monster.id;
    state.effect(FxEvent::Spawn {
        pos: monster.pos,
        size: monster.size.x,
        is_boss: false,
    });
    state.cue(Cue::Spawn);
    log::debug!("Spawned monster {} {:?} at {:?}", id, monster.kind, monster.pos);
    state.monsters.push(monster);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use crate::sim::rng::ScriptedRandom;
    use crate::tuning::Tuning;

    fn state_with(values: &[f32]) -> GameState {
        let mut state = GameState::new(
            Field::new(800.0, 600.0),
            Tuning::default(),
            Box::new(ScriptedRandom::new(values.to_vec())),
        );
        state.begin_session();
        state
    }

    #[test]
    fn test_kind_roll_regular() {
        let mut state = state_with(&[0.59, 0.0, 0.0]);
        let id = spawn_regular_monster(&mut state);
        let m = &state.monsters[0];
        assert_eq!(m.id, id);
        assert_eq!(m.kind, MonsterKind::Regular);
        assert_eq!(m.health, 1);
        assert_eq!(m.pos, Vec2::new(30.0, 30.0));
        assert_eq!(m.launch_in_ms, 4000.0);
    }

    #[test]
    fn test_kind_roll_shielded() {
        let mut state = state_with(&[0.60, 0.99, 0.5, 0.5]);
        spawn_regular_monster(&mut state);
        assert_eq!(state.monsters[0].kind, MonsterKind::Shielded { shield: 2 });
        assert_eq!(state.monsters[0].health, 1);

        let mut state = state_with(&[0.84, 0.0, 0.5, 0.5]);
        spawn_regular_monster(&mut state);
        assert_eq!(state.monsters[0].shield(), Some(1));
    }

    #[test]
    fn test_kind_roll_splitter() {
        let mut state = state_with(&[0.9, 0.5, 0.5, 0.5]);
        spawn_regular_monster(&mut state);
        assert_eq!(
            state.monsters[0].kind,
            MonsterKind::Splitter {
                split_count: 3,
                split_size: 36.0
            }
        );
    }

    #[test]
    fn test_spawn_stays_in_upper_third() {
        let mut state = state_with(&[0.1, 0.999, 0.999]);
        spawn_regular_monster(&mut state);
        let m = &state.monsters[0];
        assert!(m.pos.x <= 800.0 - 30.0);
        assert!(m.pos.y <= 200.0);
        assert!(m.pos.x >= 30.0 && m.pos.y >= 30.0);
    }

    #[test]
    fn test_spawn_requests_cue() {
        let mut state = state_with(&[0.1, 0.5, 0.5]);
        spawn_regular_monster(&mut state);
        assert!(state.fx.contains(&FxEvent::Cue(Cue::Spawn)));
        assert!(matches!(state.fx[0], FxEvent::Spawn { is_boss: false, .. }));
    }

    #[test]
    fn test_boss_health_and_sequence() {
        let mut state = state_with(&[]);
        state.session.difficulty_level = 2;
        spawn_boss_monster(&mut state);
        let boss = &state.monsters[0];
        assert_eq!(boss.health, 20);
        assert_eq!(boss.pos, Vec2::new(400.0, 150.0));
        let b = boss.boss().unwrap();
        assert_eq!(b.kind, BossKind::Chomper);
        assert!((b.speed - 0.7).abs() < 1e-6);
        assert_eq!(state.session.boss_index, 1);

        for expected in [BossKind::Spiky, BossKind::Demon, BossKind::Reaper, BossKind::Chomper] {
            state.monsters.clear();
            spawn_boss_monster(&mut state);
            assert_eq!(state.monsters[0].boss().unwrap().kind, expected);
        }
        assert_eq!(state.session.boss_index, 5);
    }

    #[test]
    fn test_boss_direction_guarded() {
        // Both draws 0.5 give a zero vector
        let mut state = state_with(&[0.5, 0.5]);
        spawn_boss_monster(&mut state);
        let dir = state.monsters[0].boss().unwrap().dir;
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_split_children() {
        let mut state = state_with(&[]);
        let parent = Monster {
            id: 99,
            pos: Vec2::new(400.0, 100.0),
            size: Vec2::splat(60.0),
            health: 0,
            kind: MonsterKind::Splitter {
                split_count: 3,
                split_size: 36.0,
            },
            spawned_at: 0.0,
            launch_in_ms: 4000.0,
            has_fired: false,
        };
        let children = split_monster(&mut state, &parent);
        assert_eq!(children.len(), 3);
        for m in &state.monsters {
            assert_eq!(m.kind, MonsterKind::Regular);
            assert_eq!(m.health, 1);
            assert_eq!(m.size, Vec2::splat(36.0));
            assert!((m.pos - parent.pos).abs().max_element() <= 30.0);
        }
    }

    #[test]
    fn test_spawn_if_due_waves_and_boss() {
        let mut state = state_with(&[]);
        spawn_if_due(&mut state);
        assert!(state.monsters.is_empty());

        state.session.elapsed_ms = 2000.0;
        spawn_if_due(&mut state);
        assert_eq!(state.monsters.len(), 1);

        state.session.difficulty_level = 2;
        state.session.elapsed_ms = 4000.0;
        spawn_if_due(&mut state);
        assert_eq!(state.monsters.len(), 4);

        state.session.elapsed_ms = 30_000.0;
        spawn_if_due(&mut state);
        assert_eq!(state.monsters.iter().filter(|m| m.is_boss()).count(), 1);

        // Second interval with the boss alive: skipped
        state.session.elapsed_ms = 60_000.0;
        spawn_if_due(&mut state);
        assert_eq!(state.monsters.iter().filter(|m| m.is_boss()).count(), 1);
        assert_eq!(state.session.boss_index, 1);
    }
}
