//! Particle effect contract and effect dispatch
//!
//! The simulation records visual/audio feedback as [`FxEvent`]s; the engine
//! forwards them here to whatever collaborators the host installed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::audio::{AudioCues, Cue};
use crate::sim::state::BonusKind;

/// Particle colors (0xRRGGBB)
pub mod colors {
    pub const REGULAR: u32 = 0xff4d4d;
    pub const SHIELD: u32 = 0x4da6ff;
    pub const SPLITTER: u32 = 0xb84dff;
    pub const BOSS: u32 = 0xffb31a;
    pub const PROJECTILE: u32 = 0xffffff;
    pub const MISS: u32 = 0x808080;
}

/// Feedback emitted by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FxEvent {
    Cue(Cue),
    Explosion {
        pos: Vec2,
        color: u32,
        count: u32,
        enhanced: bool,
    },
    Spawn {
        pos: Vec2,
        size: f32,
        is_boss: bool,
    },
    Bonus {
        pos: Vec2,
        kind: BonusKind,
    },
    Shield {
        pos: Vec2,
        radius: f32,
    },
}

/// Host particle collaborator
pub trait ParticleEffects {
    fn spawn_explosion(&mut self, x: f32, y: f32, color: u32, count: u32, enhanced: bool);
    fn spawn_spawn_effect(&mut self, x: f32, y: f32, size: f32, is_boss: bool);
    fn spawn_bonus_effect(&mut self, x: f32, y: f32, kind: BonusKind);
    fn spawn_shield_effect(&mut self, x: f32, y: f32, radius: f32);
}

/// No-op particles for headless runs
#[derive(Debug, Default)]
pub struct NullParticles;

impl ParticleEffects for NullParticles {
    fn spawn_explosion(&mut self, _x: f32, _y: f32, _color: u32, _count: u32, _enhanced: bool) {}
    fn spawn_spawn_effect(&mut self, _x: f32, _y: f32, _size: f32, _is_boss: bool) {}
    fn spawn_bonus_effect(&mut self, _x: f32, _y: f32, _kind: BonusKind) {}
    fn spawn_shield_effect(&mut self, _x: f32, _y: f32, _radius: f32) {}
}

/// Route one effect to its collaborator
pub fn dispatch(event: &FxEvent, audio: &mut dyn AudioCues, particles: &mut dyn ParticleEffects) {
    match *event {
        FxEvent::Cue(cue) => audio.play(cue.as_str()),
        FxEvent::Explosion {
            pos,
            color,
            count,
            enhanced,
        } => particles.spawn_explosion(pos.x, pos.y, color, count, enhanced),
        FxEvent::Spawn { pos, size, is_boss } => {
            particles.spawn_spawn_effect(pos.x, pos.y, size, is_boss)
        }
        FxEvent::Bonus { pos, kind } => particles.spawn_bonus_effect(pos.x, pos.y, kind),
        FxEvent::Shield { pos, radius } => particles.spawn_shield_effect(pos.x, pos.y, radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl AudioCues for Log {
        fn play(&mut self, cue: &str) {
            self.0.push(format!("play:{cue}"));
        }
        fn start_music(&mut self) {}
        fn stop_music(&mut self) {}
        fn set_mute(&mut self, _muted: bool) {}
        fn set_volume(&mut self, _volume: f32) {}
        fn set_music_volume(&mut self, _volume: f32) {}
    }

    impl ParticleEffects for Log {
        fn spawn_explosion(&mut self, x: f32, y: f32, color: u32, count: u32, enhanced: bool) {
            self.0.push(format!("explosion:{x},{y},{color:06x},{count},{enhanced}"));
        }
        fn spawn_spawn_effect(&mut self, _x: f32, _y: f32, size: f32, is_boss: bool) {
            self.0.push(format!("spawn:{size},{is_boss}"));
        }
        fn spawn_bonus_effect(&mut self, _x: f32, _y: f32, kind: BonusKind) {
            self.0.push(format!("bonus:{}", kind.as_str()));
        }
        fn spawn_shield_effect(&mut self, _x: f32, _y: f32, radius: f32) {
            self.0.push(format!("shield:{radius}"));
        }
    }

    #[test]
    fn test_dispatch_routes_events() {
        let mut audio = Log::default();
        let mut particles = Log::default();

        dispatch(&FxEvent::Cue(Cue::Kill), &mut audio, &mut particles);
        dispatch(
            &FxEvent::Explosion {
                pos: Vec2::new(1.0, 2.0),
                color: colors::BOSS,
                count: 30,
                enhanced: true,
            },
            &mut audio,
            &mut particles,
        );
        dispatch(
            &FxEvent::Bonus {
                pos: Vec2::ZERO,
                kind: BonusKind::Life,
            },
            &mut audio,
            &mut particles,
        );

        assert_eq!(audio.0, vec!["play:kill"]);
        assert_eq!(
            particles.0,
            vec!["explosion:1,2,ffb31a,30,true", "bonus:life"]
        );
    }
}
