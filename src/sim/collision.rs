//! Tap hit resolution
//!
//! A tap is tested against monsters newest-first using enlarged bounding
//! boxes; the first match takes the whole tap. Only when no monster matches
//! are projectiles tested, again newest-first, by center distance.

use glam::Vec2;

use super::state::{GameState, Monster, MonsterKind, Projectile};
use super::{boss, combo, entities, projectile};
use crate::audio::Cue;
use crate::fx::{FxEvent, colors};

/// What a single tap did
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    /// A shield took the hit; health untouched
    ShieldAbsorbed { id: u32, shield_left: u32 },
    /// Monster damaged but alive
    Hit { id: u32, health_left: u32 },
    /// Monster destroyed
    Kill { id: u32, points: u64, boss: bool },
    /// Hostile projectile shot down
    ProjectileDestroyed { id: u32 },
    /// Bonus projectile collected
    BonusCollected { id: u32 },
    /// Nothing under the tap
    Miss,
}

/// Point inside the monster's bounding box scaled by `multiplier`
#[inline]
pub fn monster_contains(monster: &Monster, point: Vec2, multiplier: f32) -> bool {
    let half = monster.size * multiplier / 2.0;
    let d = (point - monster.pos).abs();
    d.x <= half.x && d.y <= half.y
}

/// Point within `size * multiplier` of the projectile center
#[inline]
pub fn projectile_contains(projectile: &Projectile, point: Vec2, multiplier: f32) -> bool {
    projectile.pos.distance(point) <= projectile.size * multiplier
}

/// Resolve one tap at session time `now`
pub fn resolve_tap(state: &mut GameState, point: Vec2, now: f64) -> TapOutcome {
    let multiplier = state.tuning.hitbox_multiplier;

    if let Some(index) = state
        .monsters
        .iter()
        .rposition(|m| monster_contains(m, point, multiplier))
    {
        return hit_monster(state, index, now);
    }

    if let Some(index) = state
        .projectiles
        .iter()
        .rposition(|p| projectile_contains(p, point, multiplier))
    {
        return hit_projectile(state, index);
    }

    state.effect(FxEvent::Explosion {
        pos: point,
        color: colors::MISS,
        count: 3,
        enhanced: false,
    });
    state.cue(Cue::Miss);
    TapOutcome::Miss
}

fn hit_monster(state: &mut GameState, index: usize, now: f64) -> TapOutcome {
    let monster = &mut state.monsters[index];
    let (id, pos, size) = (monster.id, monster.pos, monster.size);

    if let MonsterKind::Shielded { shield } = &mut monster.kind {
        if *shield > 0 {
            *shield -= 1;
            let shield_left = *shield;
            state.effect(FxEvent::Shield {
                pos,
                radius: size.x * 0.6,
            });
            state.cue(Cue::ShieldHit);
            if shield_left == 0 {
                state.effect(FxEvent::Explosion {
                    pos,
                    color: colors::SHIELD,
                    count: 15,
                    enhanced: false,
                });
                state.cue(Cue::ShieldBreak);
            }
            return TapOutcome::ShieldAbsorbed { id, shield_left };
        }
    }

    monster.health = monster.health.saturating_sub(1);
    let health_left = monster.health;
    let color = monster.kind.color();
    state.effect(FxEvent::Explosion {
        pos,
        color,
        count: 5,
        enhanced: false,
    });
    state.cue(Cue::Hit);

    if health_left > 0 {
        return TapOutcome::Hit { id, health_left };
    }
    kill(state, index, now)
}

fn kill(state: &mut GameState, index: usize, now: f64) -> TapOutcome {
    let mut monster = state.monsters.remove(index);
    let is_boss = monster.is_boss();

    combo::register_kill(state, now);
    let base = if is_boss {
        state.tuning.boss_points
    } else {
        state.tuning.regular_points
    };
    let points = combo::kill_points(state, base);
    state.add_score(points);

    let energy = if is_boss {
        state.tuning.boss_kill_energy
    } else {
        state.tuning.kill_energy
    };
    combo::add_energy(state, energy);

    state.effect(FxEvent::Explosion {
        pos: monster.pos,
        color: monster.kind.color(),
        count: if is_boss { 40 } else { 20 },
        enhanced: is_boss,
    });
    state.cue(Cue::Kill);

    if !is_boss && state.rng().next_f32() < state.tuning.bonus_drop_chance {
        projectile::spawn_bonus(state, monster.pos);
    }
    if matches!(monster.kind, MonsterKind::Splitter { .. }) {
        entities::split_monster(state, &monster);
    }
    if is_boss {
        boss::defeat(state, &mut monster);
    }

    log::debug!(
        "Killed monster {} for {} points (combo {} x{})",
        monster.id,
        points,
        state.session.combo_count,
        state.session.combo_multiplier
    );
    TapOutcome::Kill {
        id: monster.id,
        points,
        boss: is_boss,
    }
}

fn hit_projectile(state: &mut GameState, index: usize) -> TapOutcome {
    let p = state.projectiles.remove(index);
    if let Some(kind) = p.bonus {
        projectile::apply_bonus(state, kind, p.pos);
        return TapOutcome::BonusCollected { id: p.id };
    }

    let points = state.tuning.projectile_points;
    state.add_score(points);
    state.effect(FxEvent::Explosion {
        pos: p.pos,
        color: colors::PROJECTILE,
        count: 8,
        enhanced: false,
    });
    state.cue(Cue::ProjectileHit);
    TapOutcome::ProjectileDestroyed { id: p.id }
}
