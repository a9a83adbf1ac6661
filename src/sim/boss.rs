//! Boss behavior: spawn announcement, patrol movement, attack cadence, defeat
//!
//! Bosses pick attack patterns two ways. The first launch goes through the
//! per-subtype signature dispatch; later launches use the resolution set in
//! tuning (random SINGLE/TRIPLE by default). [`launch_volley`] takes the
//! resolution explicitly so either path can be driven directly.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{self, FirePattern, Volley};
use super::state::{BossKind, BossPhase, GameEvent, GameState, Monster};
use super::timers::{DelayedEffect, Modifier};
use crate::audio::Cue;
use crate::fx::{FxEvent, colors};
use crate::polar_to_cartesian;

/// How a boss attack picks its pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAttackResolution {
    /// Uniform choice between SINGLE and TRIPLE
    RandomBasic,
    /// Fixed pattern per subtype (the only path to CIRCLE and WAVE)
    Signature,
}

/// Uniform SINGLE/TRIPLE pick (one draw)
pub fn random_pattern(state: &mut GameState) -> FirePattern {
    if state.rng().next_f32() < 0.5 {
        FirePattern::Single
    } else {
        FirePattern::Triple
    }
}

/// Subtype signature attack
pub fn signature_pattern(kind: BossKind, circle_count: u32) -> FirePattern {
    match kind {
        BossKind::Chomper => FirePattern::Triple,
        BossKind::Spiky => FirePattern::Circle {
            count: circle_count,
        },
        BossKind::Demon => FirePattern::Wave,
        BossKind::Reaper => FirePattern::Single,
    }
}

/// Fire the boss at `index` using the given resolution; returns projectiles created
pub fn launch_volley(
    state: &mut GameState,
    index: usize,
    resolution: BossAttackResolution,
) -> usize {
    let Some(monster) = state.monsters.get(index) else {
        return 0;
    };
    let Some(boss) = monster.boss() else {
        return 0;
    };
    let kind = boss.kind;
    let origin = monster.pos + Vec2::new(0.0, monster.size.y / 2.0);

    let pattern = match resolution {
        BossAttackResolution::RandomBasic => random_pattern(state),
        BossAttackResolution::Signature => {
            signature_pattern(kind, state.tuning.boss_circle_directions())
        }
    };
    let volley = Volley {
        origin,
        speed: state.tuning.boss_projectile_speed(kind),
        size: state.tuning.boss_projectile_size,
        from_boss: true,
        special_attack: resolution == BossAttackResolution::Signature,
    };
    log::debug!("Boss {} fires {:?}", kind.as_str(), pattern);
    projectile::fire(state, pattern, volley)
}

/// Advance every live boss by one tick of `dt_ms`
pub fn update(state: &mut GameState, dt_ms: f64) {
    for index in 0..state.monsters.len() {
        let Some(phase) = state.monsters[index].boss().map(|b| b.phase) else {
            continue;
        };
        match phase {
            BossPhase::Spawning => announce(state, index),
            BossPhase::Patrolling => {
                patrol(state, index);
                count_down_first_launch(state, index, dt_ms);
            }
            BossPhase::Armed => {
                patrol(state, index);
                refire_if_due(state, index);
            }
            BossPhase::Defeated => {}
        }
    }
}

/// Mark a killed boss defeated: clears projectiles and schedules the
/// explosion sequence. The caller removes the monster and awards points.
pub fn defeat(state: &mut GameState, monster: &mut Monster) {
    let Some(boss) = monster.boss_mut() else {
        return;
    };
    boss.phase = BossPhase::Defeated;
    let kind = boss.kind;

    let cleared = projectile::clear_all(state);
    let now = state.now();
    let count = state.tuning.defeat_burst_count.max(1);
    let spacing = state.tuning.defeat_burst_spacing_ms;
    let radius = monster.size.x / 3.0;
    for i in 0..count {
        let offset = if i + 1 == count {
            Vec2::ZERO
        } else {
            polar_to_cartesian(radius, TAU * i as f32 / count as f32)
        };
        state.session.schedule.schedule(
            now + spacing * i as f64,
            DelayedEffect::DefeatBurst {
                pos: monster.pos + offset,
                color: colors::BOSS,
                count: 25,
                enhanced: i + 1 == count,
            },
        );
    }
    state.cue(Cue::BossDefeat);
    log::info!(
        "Boss {} defeated at {:.0}ms ({} projectiles cleared)",
        kind.as_str(),
        now,
        cleared
    );
}

fn announce(state: &mut GameState, index: usize) {
    let monster = &mut state.monsters[index];
    let (pos, size) = (monster.pos, monster.size.x);
    let Some(boss) = monster.boss_mut() else {
        return;
    };
    boss.phase = BossPhase::Patrolling;
    let kind = boss.kind;

    state.effect(FxEvent::Spawn {
        pos,
        size,
        is_boss: true,
    });
    state.cue(Cue::BossSpawn);
    state.emit(GameEvent::BossAppeared(kind));
}

/// Move along the heading, bouncing off the side edges, the top edge and the
/// vertical midline
fn patrol(state: &mut GameState, index: usize) {
    let factor = state.freeze_factor() * state.slowdown_factor();
    let field = state.field;
    let monster = &mut state.monsters[index];
    let half = monster.size / 2.0;
    let Some((mut dir, speed)) = monster.boss().map(|b| (b.dir, b.speed)) else {
        return;
    };
    let mut pos = monster.pos + dir * speed * factor;

    if pos.x - half.x < 0.0 {
        pos.x = half.x;
        dir.x = dir.x.abs();
    } else if pos.x + half.x > field.width {
        pos.x = field.width - half.x;
        dir.x = -dir.x.abs();
    }
    let floor = field.height / 2.0;
    if pos.y - half.y < 0.0 {
        pos.y = half.y;
        dir.y = dir.y.abs();
    } else if pos.y + half.y > floor {
        pos.y = floor - half.y;
        dir.y = -dir.y.abs();
    }

    if let Some(boss) = monster.boss_mut() {
        boss.dir = dir;
    }
    monster.pos = pos;
}

fn count_down_first_launch(state: &mut GameState, index: usize, dt_ms: f64) {
    let factor = state.freeze_factor() as f64;
    let now = state.now();
    let monster = &mut state.monsters[index];
    monster.launch_in_ms -= dt_ms * factor;
    if monster.launch_in_ms > 0.0 {
        return;
    }
    monster.has_fired = true;
    if let Some(boss) = monster.boss_mut() {
        boss.phase = BossPhase::Armed;
        boss.last_fire_at = Some(now);
    }
    launch_volley(state, index, BossAttackResolution::Signature);
}

fn refire_if_due(state: &mut GameState, index: usize) {
    let now = state.now();
    let frozen = state.is_active(Modifier::TimeFrozen);
    let resolution = state.tuning.boss_refire_resolution;
    let Some(boss) = state.monsters[index].boss() else {
        return;
    };
    let mut interval = state.tuning.boss_fire_interval_ms(boss.kind);
    if frozen {
        interval *= state.tuning.freeze_boss_interval_factor;
    }
    let last = boss.last_fire_at.unwrap_or(now);
    if now - last < interval {
        return;
    }
    if let Some(boss) = state.monsters[index].boss_mut() {
        boss.last_fire_at = Some(now);
    }
    launch_volley(state, index, resolution);
}
