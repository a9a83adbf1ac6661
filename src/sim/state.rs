//! Game state and core simulation types
//!
//! Session scalars, entities and the two outboxes (host events and effect
//! cues) all live on [`GameState`], which is owned by exactly one engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use super::timers::{Modifier, Modifiers, Schedule};
use crate::Field;
use crate::audio::Cue;
use crate::fx::{FxEvent, colors};
use crate::tuning::Tuning;

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session yet (or waiting for assets)
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Timers frozen, entities kept
    Paused,
    /// Lives reached zero
    GameOver,
    /// Engine torn down, all commands ignored
    Destroyed,
}

/// Boss subtypes, in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Chomper,
    Spiky,
    Demon,
    Reaper,
}

impl BossKind {
    /// Cyclic boss sequence
    pub const SEQUENCE: [BossKind; 4] = [
        BossKind::Chomper,
        BossKind::Spiky,
        BossKind::Demon,
        BossKind::Reaper,
    ];

    pub fn from_sequence(index: u32) -> Self {
        Self::SEQUENCE[index as usize % Self::SEQUENCE.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BossKind::Chomper => "CHOMPER",
            BossKind::Spiky => "SPIKY",
            BossKind::Demon => "DEMON",
            BossKind::Reaper => "REAPER",
        }
    }
}

/// Boss lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    /// First frame after spawn
    Spawning,
    /// Moving, first launch not yet made
    Patrolling,
    /// Has fired once, re-fires on its subtype interval
    Armed,
    /// Killed; receives no further updates
    Defeated,
}

/// Boss-only state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub phase: BossPhase,
    /// Normalized movement direction
    pub dir: Vec2,
    /// Units per tick
    pub speed: f32,
    /// Session time of the latest launch
    pub last_fire_at: Option<f64>,
}

/// Monster variants with their variant-specific data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MonsterKind {
    Regular,
    Shielded { shield: u32 },
    Splitter { split_count: u32, split_size: f32 },
    Boss(Boss),
}

impl MonsterKind {
    pub fn color(&self) -> u32 {
        match self {
            MonsterKind::Regular => colors::REGULAR,
            MonsterKind::Shielded { .. } => colors::SHIELD,
            MonsterKind::Splitter { .. } => colors::SPLITTER,
            MonsterKind::Boss(_) => colors::BOSS,
        }
    }
}

/// A monster entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Bounding box (width, height)
    pub size: Vec2,
    pub health: u32,
    pub kind: MonsterKind,
    /// Session time of spawn
    pub spawned_at: f64,
    /// Remaining countdown to the first launch (ms, unscaled)
    pub launch_in_ms: f64,
    pub has_fired: bool,
}

impl Monster {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, MonsterKind::Boss(_))
    }

    pub fn boss(&self) -> Option<&Boss> {
        match &self.kind {
            MonsterKind::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        match &mut self.kind {
            MonsterKind::Boss(boss) => Some(boss),
            _ => None,
        }
    }

    /// Remaining shield pool, if shielded
    pub fn shield(&self) -> Option<u32> {
        match self.kind {
            MonsterKind::Shielded { shield } => Some(shield),
            _ => None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

/// Bonus payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    Points,
    Life,
    Slowdown,
    Shield,
    Energy,
}

impl BonusKind {
    pub const ALL: [BonusKind; 5] = [
        BonusKind::Points,
        BonusKind::Life,
        BonusKind::Slowdown,
        BonusKind::Shield,
        BonusKind::Energy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BonusKind::Points => "points",
            BonusKind::Life => "life",
            BonusKind::Slowdown => "slowdown",
            BonusKind::Shield => "shield",
            BonusKind::Energy => "energy",
        }
    }
}

/// A projectile entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Units per tick
    pub vel: Vec2,
    pub size: f32,
    pub from_boss: bool,
    /// Launched by a boss signature attack
    pub special_attack: bool,
    /// Bonus payload; bonus projectiles never hurt the player
    pub bonus: Option<BonusKind>,
}

impl Projectile {
    pub fn is_bonus(&self) -> bool {
        self.bonus.is_some()
    }
}

/// Special abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    TimeFreeze,
    ExplosiveWave,
    Shield,
}

impl AbilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbilityKind::TimeFreeze => "timeFreeze",
            AbilityKind::ExplosiveWave => "explosiveWave",
            AbilityKind::Shield => "shield",
        }
    }
}

/// Notifications for the host, drained by the engine after every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ScoreChanged(u64),
    LivesChanged(u8),
    GameOver,
    BossAppeared(BossKind),
    DifficultyIncreased { level: u32, monsters_per_wave: u32 },
    ComboChanged { count: u32, multiplier: u32 },
    EnergyChanged { energy: u32, max_energy: u32 },
    SpecialAbilityActivated { ability: AbilityKind, duration_secs: f32 },
    BonusCollected(BonusKind),
}

/// Per-session scalars and timer bookkeeping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub score: u64,
    pub lives: u8,
    pub combo_count: u32,
    pub combo_multiplier: u32,
    /// Session time of the latest kill
    pub last_kill_at: Option<f64>,
    pub energy: u32,
    pub difficulty_level: u32,
    /// Session clock (ms); advances only while running
    pub elapsed_ms: f64,
    pub boss_index: u32,
    pub last_wave_at: f64,
    pub last_boss_at: f64,
    pub ticks: u64,
    pub modifiers: Modifiers,
    pub schedule: Schedule,
}

impl SessionState {
    /// Fresh running session
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            phase: SessionPhase::Running,
            lives: tuning.initial_lives,
            combo_multiplier: 1,
            ..Default::default()
        }
    }
}

/// Serializable summary for HUDs and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub score: u64,
    pub lives: u8,
    pub combo_count: u32,
    pub combo_multiplier: u32,
    pub energy: u32,
    pub difficulty_level: u32,
    pub elapsed_ms: f64,
    pub boss_index: u32,
    pub monsters: usize,
    pub bosses: usize,
    pub projectiles: usize,
    pub active_modifiers: Vec<Modifier>,
}

/// Complete simulation state
pub struct GameState {
    pub field: Field,
    pub tuning: Tuning,
    pub session: SessionState,
    /// Spawn order; newest last
    pub monsters: Vec<Monster>,
    /// Insertion order; newest last
    pub projectiles: Vec<Projectile>,
    /// Host-facing notifications awaiting dispatch
    pub events: Vec<GameEvent>,
    /// Audio/particle feedback awaiting dispatch
    pub fx: Vec<FxEvent>,
    rng: Box<dyn RandomSource>,
    next_id: u32,
}

impl GameState {
    /// Create an idle state; call [`GameState::begin_session`] to play
    pub fn new(field: Field, tuning: Tuning, rng: Box<dyn RandomSource>) -> Self {
        Self {
            field,
            tuning,
            session: SessionState::default(),
            monsters: Vec::new(),
            projectiles: Vec::new(),
            events: Vec::new(),
            fx: Vec::new(),
            rng,
            next_id: 1,
        }
    }

    /// Discard every entity and timer and start a fresh running session
    pub fn begin_session(&mut self) {
        self.session = SessionState::new(&self.tuning);
        self.monsters.clear();
        self.projectiles.clear();
        self.fx.clear();
        self.next_id = 1;

        let max_energy = self.tuning.max_energy;
        self.emit(GameEvent::ScoreChanged(0));
        self.emit(GameEvent::LivesChanged(self.session.lives));
        self.emit(GameEvent::ComboChanged {
            count: 0,
            multiplier: 1,
        });
        self.emit(GameEvent::EnergyChanged {
            energy: 0,
            max_energy,
        });
    }

    /// Drop the session and all entities (engine teardown)
    pub fn clear(&mut self) {
        self.session = SessionState::default();
        self.monsters.clear();
        self.projectiles.clear();
        self.events.clear();
        self.fx.clear();
    }

    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    /// Swap the random source (tests force outcomes this way)
    pub fn set_rng(&mut self, rng: Box<dyn RandomSource>) {
        self.rng = rng;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Current session time (ms)
    #[inline]
    pub fn now(&self) -> f64 {
        self.session.elapsed_ms
    }

    pub fn is_running(&self) -> bool {
        self.session.phase == SessionPhase::Running
    }

    pub fn is_active(&self, modifier: Modifier) -> bool {
        self.session.modifiers.is_active(modifier, self.now())
    }

    /// 0.2 while time is frozen, else 1
    pub fn freeze_factor(&self) -> f32 {
        if self.is_active(Modifier::TimeFrozen) {
            self.tuning.freeze_factor
        } else {
            1.0
        }
    }

    /// 0.5 while the slowdown bonus is active, else 1
    pub fn slowdown_factor(&self) -> f32 {
        if self.is_active(Modifier::SlowdownActive) {
            self.tuning.slowdown_factor
        } else {
            1.0
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: Cue) {
        self.fx.push(FxEvent::Cue(cue));
    }

    pub fn effect(&mut self, fx: FxEvent) {
        self.fx.push(fx);
    }

    /// Add points and notify the host
    pub fn add_score(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.session.score += points;
        self.emit(GameEvent::ScoreChanged(self.session.score));
    }

    pub fn set_lives(&mut self, lives: u8) {
        let lives = lives.min(self.tuning.max_lives);
        if lives != self.session.lives {
            self.session.lives = lives;
            self.emit(GameEvent::LivesChanged(lives));
        }
    }

    pub fn monster_index(&self, id: u32) -> Option<usize> {
        self.monsters.iter().position(|m| m.id == id)
    }

    pub fn live_boss(&self) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.is_boss())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn drain_fx(&mut self) -> Vec<FxEvent> {
        std::mem::take(&mut self.fx)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let s = &self.session;
        SessionSnapshot {
            phase: s.phase,
            score: s.score,
            lives: s.lives,
            combo_count: s.combo_count,
            combo_multiplier: s.combo_multiplier,
            energy: s.energy,
            difficulty_level: s.difficulty_level,
            elapsed_ms: s.elapsed_ms,
            boss_index: s.boss_index,
            monsters: self.monsters.len(),
            bosses: self.monsters.iter().filter(|m| m.is_boss()).count(),
            projectiles: self.projectiles.len(),
            active_modifiers: s.modifiers.active(s.elapsed_ms),
        }
    }
}
