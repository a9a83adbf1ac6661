//! Data-driven game balance
//!
//! Every gameplay constant lives here under a name so balance changes and
//! tests can refer to it. `Default` is the shipped balance; hosts may layer a
//! partial JSON override on top with [`Tuning::from_json`].

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::sim::boss::BossAttackResolution;
use crate::sim::state::BossKind;

/// One row of the difficulty ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyLevel {
    /// Session time (ms) at which this level is reached
    pub threshold_ms: f64,
    /// Countdown before a freshly spawned monster fires (ms)
    pub projectile_interval_ms: f64,
    /// Monsters spawned per wave
    pub monsters_per_wave: u32,
}

/// Per-subtype boss attack parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossProfile {
    pub kind: BossKind,
    pub fire_interval_ms: f64,
    pub projectile_speed: f32,
}

/// Ability price and duration (duration 0 = instantaneous)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub cost: u32,
    pub duration_ms: f64,
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub initial_lives: u8,
    pub max_lives: u8,
    pub max_energy: u32,

    // === Hit testing ===
    /// Scale applied to bounding boxes when testing taps
    pub hitbox_multiplier: f32,

    // === Spawning ===
    pub monster_size: f32,
    pub boss_size: f32,
    pub wave_interval_ms: f64,
    pub boss_interval_ms: f64,
    /// Roll below this spawns a regular monster
    pub regular_chance: f32,
    /// Roll below `regular_chance + shielded_chance` spawns a shielded one
    pub shielded_chance: f32,
    pub shield_health_min: u32,
    /// Shield health is `min + floor(r * spread)`
    pub shield_health_spread: u32,
    pub split_count_min: u32,
    pub split_count_spread: u32,
    /// Child size relative to the base monster size
    pub split_size_factor: f32,

    // === Bosses ===
    pub boss_base_health: u32,
    pub boss_health_per_level: u32,
    pub boss_speed_base: f32,
    pub boss_speed_per_level: f32,
    pub boss_profiles: Vec<BossProfile>,
    /// Fire interval for subtypes with no profile entry
    pub default_boss_fire_interval_ms: f64,
    pub default_boss_projectile_speed: f32,
    /// CIRCLE directions in a boss signature attack; `None` uses `circle_count`
    pub boss_circle_count: Option<u32>,
    /// How bosses pick a pattern after their first launch
    pub boss_refire_resolution: BossAttackResolution,
    pub defeat_burst_count: u32,
    pub defeat_burst_spacing_ms: f64,

    // === Scoring and combo ===
    pub regular_points: u64,
    pub boss_points: u64,
    pub projectile_points: u64,
    pub combo_timeout_ms: f64,
    /// Kills per multiplier step
    pub combo_step: u32,
    pub max_combo_multiplier: u32,
    pub bonus_points_factor: u64,

    // === Energy and abilities ===
    pub kill_energy: u32,
    pub boss_kill_energy: u32,
    pub time_freeze: AbilityCost,
    pub explosive_wave: AbilityCost,
    pub shield: AbilityCost,
    pub explosive_wave_boss_damage: u32,
    /// Movement and countdown scale while time is frozen
    pub freeze_factor: f32,
    /// Boss fire interval scale while time is frozen
    pub freeze_boss_interval_factor: f64,
    pub slowdown_factor: f32,

    // === Bonuses ===
    pub bonus_drop_chance: f32,
    pub bonus_points_duration_ms: f64,
    pub bonus_slowdown_duration_ms: f64,
    pub bonus_shield_duration_ms: f64,
    pub bonus_energy: u32,
    pub bonus_size: f32,
    pub bonus_fall_speed: f32,
    pub bonus_max_drift: f32,

    // === Projectiles ===
    pub projectile_speed: f32,
    pub projectile_size: f32,
    pub boss_projectile_size: f32,
    /// Half-angle of the SINGLE cone (degrees from straight down)
    pub single_cone_degrees: f32,
    pub triple_angles_degrees: [f32; 3],
    /// CIRCLE directions when no boss count is configured
    pub circle_count: u32,
    pub wave_column_spacing: f32,

    // === Difficulty ramp ===
    pub difficulty_levels: Vec<DifficultyLevel>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_lives: 3,
            max_lives: 5,
            max_energy: 100,

            hitbox_multiplier: 1.3,

            monster_size: 60.0,
            boss_size: 120.0,
            wave_interval_ms: 2000.0,
            boss_interval_ms: 30_000.0,
            regular_chance: 0.60,
            shielded_chance: 0.25,
            shield_health_min: 1,
            shield_health_spread: 2,
            split_count_min: 2,
            split_count_spread: 2,
            split_size_factor: 0.6,

            boss_base_health: 10,
            boss_health_per_level: 5,
            boss_speed_base: 0.5,
            boss_speed_per_level: 0.1,
            boss_profiles: vec![
                BossProfile {
                    kind: BossKind::Chomper,
                    fire_interval_ms: 5000.0,
                    projectile_speed: 3.0,
                },
                BossProfile {
                    kind: BossKind::Spiky,
                    fire_interval_ms: 4000.0,
                    projectile_speed: 3.5,
                },
                BossProfile {
                    kind: BossKind::Demon,
                    fire_interval_ms: 3000.0,
                    projectile_speed: 4.0,
                },
            ],
            default_boss_fire_interval_ms: 5000.0,
            default_boss_projectile_speed: 3.0,
            boss_circle_count: Some(8),
            boss_refire_resolution: BossAttackResolution::RandomBasic,
            defeat_burst_count: 5,
            defeat_burst_spacing_ms: 200.0,

            regular_points: 1,
            boss_points: 20,
            projectile_points: 1,
            combo_timeout_ms: 1500.0,
            combo_step: 3,
            max_combo_multiplier: 5,
            bonus_points_factor: 2,

            kill_energy: 5,
            boss_kill_energy: 25,
            time_freeze: AbilityCost {
                cost: 50,
                duration_ms: 5000.0,
            },
            explosive_wave: AbilityCost {
                cost: 75,
                duration_ms: 0.0,
            },
            shield: AbilityCost {
                cost: 60,
                duration_ms: 5000.0,
            },
            explosive_wave_boss_damage: 2,
            freeze_factor: 0.2,
            freeze_boss_interval_factor: 5.0,
            slowdown_factor: 0.5,

            bonus_drop_chance: 0.2,
            bonus_points_duration_ms: 10_000.0,
            bonus_slowdown_duration_ms: 5000.0,
            bonus_shield_duration_ms: 5000.0,
            bonus_energy: 25,
            bonus_size: 24.0,
            bonus_fall_speed: 1.0,
            bonus_max_drift: 0.5,

            projectile_speed: 3.0,
            projectile_size: 16.0,
            boss_projectile_size: 24.0,
            single_cone_degrees: 30.0,
            triple_angles_degrees: [-20.0, 0.0, 20.0],
            circle_count: 6,
            wave_column_spacing: 40.0,

            difficulty_levels: vec![
                DifficultyLevel {
                    threshold_ms: 0.0,
                    projectile_interval_ms: 4000.0,
                    monsters_per_wave: 1,
                },
                DifficultyLevel {
                    threshold_ms: 30_000.0,
                    projectile_interval_ms: 3000.0,
                    monsters_per_wave: 2,
                },
                DifficultyLevel {
                    threshold_ms: 60_000.0,
                    projectile_interval_ms: 2000.0,
                    monsters_per_wave: 3,
                },
                DifficultyLevel {
                    threshold_ms: 90_000.0,
                    projectile_interval_ms: 1500.0,
                    monsters_per_wave: 4,
                },
                DifficultyLevel {
                    threshold_ms: 120_000.0,
                    projectile_interval_ms: 1000.0,
                    monsters_per_wave: 5,
                },
            ],
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate the result
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let tuning: Tuning = serde_json::from_str(json).map_err(EngineError::TuningParse)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject tables the simulation cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidTuning(msg));

        for (name, p) in [
            ("regular_chance", self.regular_chance),
            ("shielded_chance", self.shielded_chance),
            ("bonus_drop_chance", self.bonus_drop_chance),
            ("freeze_factor", self.freeze_factor),
            ("slowdown_factor", self.slowdown_factor),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        if self.regular_chance + self.shielded_chance > 1.0 {
            return invalid("regular_chance + shielded_chance exceeds 1".to_string());
        }
        if self.hitbox_multiplier <= 0.0 || self.monster_size <= 0.0 || self.boss_size <= 0.0 {
            return invalid("sizes and hitbox multiplier must be positive".to_string());
        }
        if self.split_size_factor <= 0.0 {
            return invalid("split_size_factor must be positive".to_string());
        }
        if self.max_lives < self.initial_lives || self.initial_lives == 0 {
            return invalid(format!(
                "lives out of range: initial {} max {}",
                self.initial_lives, self.max_lives
            ));
        }
        if self.combo_step == 0 || self.max_combo_multiplier == 0 {
            return invalid("combo step and max multiplier must be non-zero".to_string());
        }
        match self.difficulty_levels.first() {
            Some(first) if first.threshold_ms == 0.0 => {}
            _ => return invalid("difficulty table must start at threshold 0".to_string()),
        }
        if self
            .difficulty_levels
            .windows(2)
            .any(|w| w[1].threshold_ms <= w[0].threshold_ms)
        {
            return invalid("difficulty thresholds must be strictly increasing".to_string());
        }
        if self.wave_interval_ms <= 0.0 || self.boss_interval_ms <= 0.0 {
            return invalid("spawn intervals must be positive".to_string());
        }
        Ok(())
    }

    /// Highest reachable difficulty level index
    pub fn max_level(&self) -> u32 {
        self.difficulty_levels.len().saturating_sub(1) as u32
    }

    /// Difficulty row for a level (clamped to the table)
    pub fn level(&self, level: u32) -> DifficultyLevel {
        let idx = (level as usize).min(self.difficulty_levels.len().saturating_sub(1));
        self.difficulty_levels
            .get(idx)
            .copied()
            .unwrap_or(DifficultyLevel {
                threshold_ms: 0.0,
                projectile_interval_ms: 4000.0,
                monsters_per_wave: 1,
            })
    }

    pub fn boss_fire_interval_ms(&self, kind: BossKind) -> f64 {
        self.boss_profiles
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.fire_interval_ms)
            .unwrap_or(self.default_boss_fire_interval_ms)
    }

    pub fn boss_circle_directions(&self) -> u32 {
        self.boss_circle_count.unwrap_or(self.circle_count)
    }

    pub fn boss_projectile_speed(&self, kind: BossKind) -> f32 {
        self.boss_profiles
            .iter()
            .find(|p| p.kind == kind)
            .map(|p| p.projectile_speed)
            .unwrap_or(self.default_boss_projectile_speed)
    }
}
