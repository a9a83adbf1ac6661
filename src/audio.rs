//! Audio cue contract
//!
//! The engine never produces sound itself. It names cues and hands them to an
//! [`AudioCues`] implementation owned by the host, fire-and-forget.

use serde::{Deserialize, Serialize};

/// Sound cue names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Monster appears
    Spawn,
    /// Boss appears
    BossSpawn,
    /// Tap damaged a monster without killing it
    Hit,
    /// Tap absorbed by a shield
    ShieldHit,
    /// Shield pool depleted
    ShieldBreak,
    /// Monster destroyed
    Kill,
    /// Boss destroyed
    BossDefeat,
    /// One burst of the boss defeat sequence
    Explosion,
    /// Monster or boss fired
    Shoot,
    /// Tap destroyed a projectile
    ProjectileHit,
    /// Projectile escaped and cost a life
    LifeLost,
    /// Projectile escaped but the shield absorbed it
    ShieldAbsorb,
    /// Bonus collected
    Bonus,
    /// Tap hit nothing
    Miss,
    /// Difficulty level increased
    LevelUp,
    /// Special ability triggered
    Ability,
    /// Session ended
    GameOver,
}

impl Cue {
    /// Cue name passed to the host's `play(cueName)`
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Spawn => "spawn",
            Cue::BossSpawn => "bossSpawn",
            Cue::Hit => "hit",
            Cue::ShieldHit => "shieldHit",
            Cue::ShieldBreak => "shieldBreak",
            Cue::Kill => "kill",
            Cue::BossDefeat => "bossDefeat",
            Cue::Explosion => "explosion",
            Cue::Shoot => "shoot",
            Cue::ProjectileHit => "projectileHit",
            Cue::LifeLost => "lifeLost",
            Cue::ShieldAbsorb => "shieldAbsorb",
            Cue::Bonus => "bonus",
            Cue::Miss => "miss",
            Cue::LevelUp => "levelUp",
            Cue::Ability => "ability",
            Cue::GameOver => "gameOver",
        }
    }
}

/// Host audio collaborator
pub trait AudioCues {
    fn play(&mut self, cue: &str);
    fn start_music(&mut self);
    fn stop_music(&mut self);
    fn set_mute(&mut self, muted: bool);
    fn set_volume(&mut self, volume: f32);
    fn set_music_volume(&mut self, volume: f32);
}

/// Silent collaborator for headless runs
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioCues for NullAudio {
    fn play(&mut self, _cue: &str) {}
    fn start_music(&mut self) {}
    fn stop_music(&mut self) {}
    fn set_mute(&mut self, _muted: bool) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn set_music_volume(&mut self, _volume: f32) {}
}
