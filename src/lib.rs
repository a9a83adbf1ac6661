//! Tap Siege - a tap-to-defend arcade engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, hit resolution, bosses, combos)
//! - `engine`: Host-facing game loop (commands, frame driver, callbacks)
//! - `audio` / `fx`: Fire-and-forget contracts for sound and particle collaborators
//! - `assets`: Asset readiness gating with a bounded timeout
//! - `tuning`: Data-driven game balance

pub mod assets;
pub mod audio;
pub mod engine;
pub mod error;
pub mod fx;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use engine::{Engine, GameCallbacks, NoopCallbacks};
pub use error::EngineError;
pub use highscores::HighScore;
pub use settings::AudioSettings;
pub use tuning::Tuning;

use glam::Vec2;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta the driver will accept (tab switches, debugger stalls)
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Gameplay starts after this long even if some assets never arrived
    pub const ASSET_TIMEOUT_MS: f64 = 5000.0;
}

/// Playfield dimensions in render-surface units (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Check if a circle of the given radius is entirely outside the field
    #[inline]
    pub fn is_outside(&self, pos: Vec2, radius: f32) -> bool {
        pos.x + radius < 0.0
            || pos.x - radius > self.width
            || pos.y + radius < 0.0
            || pos.y - radius > self.height
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Unit direction for an angle measured in degrees from straight down
/// (positive angles lean right in screen space)
#[inline]
pub fn direction_from_down(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.sin(), rad.cos())
}

/// Convert polar (r, theta) to cartesian offset (screen space)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}
