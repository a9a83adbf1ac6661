//! Host-facing game loop
//!
//! [`Engine`] owns one [`GameState`] and drives it from host frame
//! timestamps with a fixed-timestep accumulator. After every command or
//! frame it drains the simulation outboxes: [`GameEvent`]s go to the host's
//! [`GameCallbacks`], effect cues go to the audio and particle collaborators.
//!
//! A panic anywhere inside a frame is caught, logged and reported as
//! [`EngineError::FramePanic`]; the next frame runs normally. Taps and
//! commands are isolated the same way.

use std::panic::{self, AssertUnwindSafe};

use glam::Vec2;

use crate::Field;
use crate::assets::AssetTracker;
use crate::audio::{AudioCues, NullAudio};
use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, TICK_MS};
use crate::error::EngineError;
use crate::fx::{self, NullParticles, ParticleEffects};
use crate::highscores::HighScore;
use crate::settings::AudioSettings;
use crate::sim::abilities;
use crate::sim::collision::{self, TapOutcome};
use crate::sim::rng::{PcgRandom, RandomSource};
use crate::sim::state::{
    AbilityKind, BonusKind, BossKind, GameEvent, GameState, SessionPhase, SessionSnapshot,
};
use crate::sim::tick::{TickInput, tick};
use crate::tuning::Tuning;

/// Accumulator slack so host timestamps with float jitter still produce
/// whole ticks
const ACCUMULATOR_EPSILON: f64 = 1e-6;

/// Engine → host notifications. Every method defaults to a no-op.
pub trait GameCallbacks {
    fn on_score_change(&mut self, _score: u64) {}
    fn on_lives_change(&mut self, _lives: u8) {}
    fn on_game_over(&mut self) {}
    fn on_boss_appear(&mut self, _kind: BossKind) {}
    fn on_difficulty_increase(&mut self, _level: u32, _monsters_per_wave: u32) {}
    fn on_combo_change(&mut self, _count: u32, _multiplier: u32) {}
    fn on_energy_change(&mut self, _energy: u32, _max_energy: u32) {}
    fn on_special_ability_activated(&mut self, _name: &str, _duration_secs: f32) {}
    fn on_bonus_collected(&mut self, _kind: BonusKind) {}
}

/// Host that ignores every notification
#[derive(Debug, Default)]
pub struct NoopCallbacks;

impl GameCallbacks for NoopCallbacks {}

/// The game loop
pub struct Engine {
    state: GameState,
    callbacks: Box<dyn GameCallbacks>,
    audio: Box<dyn AudioCues>,
    particles: Box<dyn ParticleEffects>,
    assets: AssetTracker,
    settings: AudioSettings,
    high_score: HighScore,
    /// `start()` is waiting on assets
    pending_start: bool,
    last_frame_ts: Option<f64>,
    accumulator: f64,
    frames: u64,
    autoplay: bool,
}

impl Engine {
    /// Engine with a seeded PCG random source and silent collaborators
    pub fn new(field: Field, tuning: Tuning, seed: u64) -> Self {
        Self::with_rng(field, tuning, Box::new(PcgRandom::new(seed)))
    }

    pub fn with_rng(field: Field, tuning: Tuning, rng: Box<dyn RandomSource>) -> Self {
        Self {
            state: GameState::new(field, tuning, rng),
            callbacks: Box::new(NoopCallbacks),
            audio: Box::new(NullAudio),
            particles: Box::new(NullParticles),
            assets: AssetTracker::new(),
            settings: AudioSettings::default(),
            high_score: HighScore::default(),
            pending_start: false,
            last_frame_ts: None,
            accumulator: 0.0,
            frames: 0,
            autoplay: false,
        }
    }

    pub fn set_callbacks(&mut self, callbacks: Box<dyn GameCallbacks>) {
        self.callbacks = callbacks;
    }

    /// Attach the audio collaborator and push the current preferences to it
    pub fn set_audio(&mut self, audio: Box<dyn AudioCues>) {
        self.audio = audio;
        self.apply_audio_settings();
    }

    pub fn set_particles(&mut self, particles: Box<dyn ParticleEffects>) {
        self.particles = particles;
    }

    /// Restore persisted audio preferences
    pub fn set_settings(&mut self, settings: AudioSettings) {
        self.settings = settings;
        self.apply_audio_settings();
    }

    /// Restore the persisted best score
    pub fn set_high_score(&mut self, high_score: HighScore) {
        self.high_score = high_score;
    }

    /// Let a simple bot play (demo / attract mode)
    pub fn set_autoplay(&mut self, autoplay: bool) {
        self.autoplay = autoplay;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn assets_mut(&mut self) -> &mut AssetTracker {
        &mut self.assets
    }

    pub fn settings(&self) -> &AudioSettings {
        &self.settings
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.session.phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn is_destroyed(&self) -> bool {
        self.phase() == SessionPhase::Destroyed
    }

    // === Session commands ===

    /// Begin a session from Idle or GameOver. Deferred until assets are
    /// ready (or timed out) when some are still loading.
    pub fn start(&mut self) {
        if !matches!(self.phase(), SessionPhase::Idle | SessionPhase::GameOver) {
            return;
        }
        if self.assets.pending() > 0 {
            log::info!("Start requested, waiting for {} assets", self.assets.pending());
            self.pending_start = true;
            return;
        }
        self.begin_session();
    }

    /// Discard the current session and begin a fresh one. From Idle this
    /// waits for assets like [`Engine::start`].
    pub fn restart(&mut self) {
        if self.is_destroyed() {
            return;
        }
        if self.phase() == SessionPhase::Idle && self.assets.pending() > 0 {
            self.start();
            return;
        }
        self.pending_start = false;
        self.begin_session();
    }

    pub fn pause_game(&mut self) {
        if self.phase() != SessionPhase::Running {
            return;
        }
        self.state.session.phase = SessionPhase::Paused;
        self.accumulator = 0.0;
        self.audio.stop_music();
        log::info!("Paused at {:.0}ms", self.state.now());
    }

    pub fn resume_game(&mut self) {
        if self.phase() != SessionPhase::Paused {
            return;
        }
        self.state.session.phase = SessionPhase::Running;
        self.accumulator = 0.0;
        self.audio.start_music();
        log::info!("Resumed at {:.0}ms", self.state.now());
    }

    /// Tear down: entities, timers and pending callbacks are dropped and every
    /// later command is ignored
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.audio.stop_music();
        self.state.clear();
        self.state.session.phase = SessionPhase::Destroyed;
        self.pending_start = false;
        log::info!("Engine destroyed after {} frames", self.frames);
    }

    fn begin_session(&mut self) {
        self.state.begin_session();
        self.accumulator = 0.0;
        self.audio.start_music();
        log::info!(
            "Session started on {}x{} field (best {})",
            self.state.field.width,
            self.state.field.height,
            self.high_score.best
        );
        self.dispatch_guarded();
    }

    // === Audio commands ===

    /// Returns the new mute state
    pub fn toggle_mute(&mut self) -> bool {
        if self.is_destroyed() {
            return self.settings.muted;
        }
        let muted = self.settings.toggle_mute();
        self.audio.set_mute(muted);
        muted
    }

    pub fn set_volume(&mut self, volume: f32) {
        if self.is_destroyed() {
            return;
        }
        let volume = self.settings.set_master_volume(volume);
        self.audio.set_volume(volume);
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        if self.is_destroyed() {
            return;
        }
        let volume = self.settings.set_music_volume(volume);
        self.audio.set_music_volume(volume);
    }

    fn apply_audio_settings(&mut self) {
        self.audio.set_mute(self.settings.muted);
        self.audio.set_volume(self.settings.master_volume);
        self.audio.set_music_volume(self.settings.music_volume);
    }

    // === Abilities ===

    pub fn activate_time_freeze(&mut self) -> bool {
        self.activate(AbilityKind::TimeFreeze)
    }

    pub fn activate_explosive_wave(&mut self) -> bool {
        self.activate(AbilityKind::ExplosiveWave)
    }

    pub fn activate_shield(&mut self) -> bool {
        self.activate(AbilityKind::Shield)
    }

    fn activate(&mut self, ability: AbilityKind) -> bool {
        self.guarded(|engine| {
            let activated = abilities::activate(&mut engine.state, ability);
            if activated {
                engine.dispatch();
            }
            activated
        })
        .unwrap_or(false)
    }

    // === Input ===

    /// Resolve one contact at surface coordinates `(x, y)` with host
    /// timestamp `timestamp`. Ignored unless a session is running.
    pub fn tap(&mut self, x: f32, y: f32, timestamp: f64) -> Option<TapOutcome> {
        if !self.state.is_running() {
            return None;
        }
        let since_frame = self
            .last_frame_ts
            .map_or(0.0, |last| (timestamp - last).clamp(0.0, MAX_FRAME_MS));
        let at = self.state.now() + since_frame;
        self.guarded(|engine| {
            let outcome = collision::resolve_tap(&mut engine.state, Vec2::new(x, y), at);
            engine.dispatch();
            outcome
        })
    }

    /// Resolve several contacts in event order
    pub fn taps(&mut self, points: &[(f32, f32, f64)]) -> Vec<TapOutcome> {
        points
            .iter()
            .filter_map(|&(x, y, ts)| self.tap(x, y, ts))
            .collect()
    }

    // === Frame driver ===

    /// Advance by one host frame at timestamp `now` (ms).
    ///
    /// Returns the number of simulation ticks run.
    pub fn frame(&mut self, now: f64) -> Result<u32, EngineError> {
        if self.is_destroyed() {
            return Ok(0);
        }
        self.frames += 1;

        let dt = self
            .last_frame_ts
            .map_or(0.0, |last| (now - last).clamp(0.0, MAX_FRAME_MS));
        self.last_frame_ts = Some(now);

        if self.pending_start && self.assets.poll(now) {
            self.pending_start = false;
            let placeholders = self.assets.placeholders().len();
            if placeholders > 0 {
                log::warn!("Starting with {} placeholder assets", placeholders);
            }
            self.begin_session();
        }

        if !self.state.is_running() {
            self.accumulator = 0.0;
            return Ok(0);
        }
        // Drop backlog the substep cap could never work off
        self.accumulator = (self.accumulator + dt).min(TICK_MS * MAX_SUBSTEPS as f64);

        let frame = self.frames;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let ticks = self.run_ticks();
            self.dispatch();
            ticks
        }));
        result.map_err(|payload| {
            self.accumulator = 0.0;
            let err = EngineError::FramePanic {
                frame,
                message: panic_message(payload.as_ref()),
            };
            log::error!("{}", err);
            err
        })
    }

    fn run_ticks(&mut self) -> u32 {
        let input = TickInput {
            taps: Vec::new(),
            autoplay: self.autoplay,
        };
        let mut substeps = 0;
        while self.accumulator + ACCUMULATOR_EPSILON >= TICK_MS && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &input, TICK_MS);
            self.accumulator = (self.accumulator - TICK_MS).max(0.0);
            substeps += 1;
            if !self.state.is_running() {
                self.accumulator = 0.0;
                break;
            }
        }
        substeps
    }

    // === Dispatch ===

    /// Dispatch outside the frame driver (session commands)
    fn dispatch_guarded(&mut self) {
        self.guarded(|engine| engine.dispatch());
    }

    /// Run a command or input with panic isolation. A panic is logged as
    /// [`EngineError::FramePanic`] and yields `None`.
    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        let frame = self.frames;
        match panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            Ok(value) => Some(value),
            Err(payload) => {
                let err = EngineError::FramePanic {
                    frame,
                    message: panic_message(payload.as_ref()),
                };
                log::error!("{}", err);
                None
            }
        }
    }

    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            self.notify(event);
        }
        for effect in self.state.drain_fx() {
            fx::dispatch(&effect, self.audio.as_mut(), self.particles.as_mut());
        }
    }

    fn notify(&mut self, event: GameEvent) {
        let callbacks = self.callbacks.as_mut();
        match event {
            GameEvent::ScoreChanged(score) => callbacks.on_score_change(score),
            GameEvent::LivesChanged(lives) => callbacks.on_lives_change(lives),
            GameEvent::GameOver => {
                self.audio.stop_music();
                self.high_score.record(self.state.session.score);
                callbacks.on_game_over();
            }
            GameEvent::BossAppeared(kind) => callbacks.on_boss_appear(kind),
            GameEvent::DifficultyIncreased {
                level,
                monsters_per_wave,
            } => callbacks.on_difficulty_increase(level, monsters_per_wave),
            GameEvent::ComboChanged { count, multiplier } => {
                callbacks.on_combo_change(count, multiplier)
            }
            GameEvent::EnergyChanged { energy, max_energy } => {
                callbacks.on_energy_change(energy, max_energy)
            }
            GameEvent::SpecialAbilityActivated {
                ability,
                duration_secs,
            } => callbacks.on_special_ability_activated(ability.as_str(), duration_secs),
            GameEvent::BonusCollected(kind) => callbacks.on_bonus_collected(kind),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
