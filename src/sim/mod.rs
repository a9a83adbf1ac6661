//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Session clock only (no wall-clock reads)
//! - Injected random source only
//! - Stable iteration order (spawn order, newest last)
//! - No host, audio or particle dependencies; output goes to the outboxes

pub mod abilities;
pub mod boss;
pub mod collision;
pub mod combo;
pub mod difficulty;
pub mod entities;
pub mod projectile;
pub mod rng;
pub mod state;
pub mod tick;
pub mod timers;

pub use boss::BossAttackResolution;
pub use collision::{TapOutcome, resolve_tap};
pub use projectile::FirePattern;
pub use rng::{PcgRandom, RandomSource, ScriptedRandom};
pub use state::{
    AbilityKind, BonusKind, Boss, BossKind, BossPhase, GameEvent, GameState, Monster, MonsterKind,
    Projectile, SessionPhase, SessionSnapshot, SessionState,
};
pub use tick::{Tap, TickInput, tick};
pub use timers::Modifier;
