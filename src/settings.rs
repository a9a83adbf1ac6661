//! Audio preferences
//!
//! Persisted by the host as JSON, separately from the high score.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Player audio preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            music_volume: 0.7,
            muted: false,
        }
    }
}

impl AudioSettings {
    /// Storage key the host should persist under
    pub const STORAGE_KEY: &'static str = "tap_siege_audio";

    pub fn set_master_volume(&mut self, volume: f32) -> f32 {
        self.master_volume = clamp_volume(volume);
        self.master_volume
    }

    pub fn set_music_volume(&mut self, volume: f32) -> f32 {
        self.music_volume = clamp_volume(volume);
        self.music_volume
    }

    /// Flip mute; returns the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn to_json(&self) -> String {
        // A struct of floats and a bool always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse persisted settings; out-of-range volumes are clamped
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let mut settings: AudioSettings =
            serde_json::from_str(json).map_err(EngineError::SettingsParse)?;
        settings.master_volume = clamp_volume(settings.master_volume);
        settings.music_volume = clamp_volume(settings.music_volume);
        log::info!("Loaded audio settings");
        Ok(settings)
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamping() {
        let mut settings = AudioSettings::default();
        assert_eq!(settings.set_master_volume(1.5), 1.0);
        assert_eq!(settings.set_music_volume(-0.2), 0.0);
        assert_eq!(settings.set_music_volume(f32::NAN), 0.0);
    }

    #[test]
    fn test_json_persistence() {
        let mut settings = AudioSettings::default();
        settings.toggle_mute();
        settings.set_music_volume(0.25);

        let restored = AudioSettings::from_json(&settings.to_json()).unwrap();
        assert_eq!(restored, settings);

        let partial = AudioSettings::from_json(r#"{"master_volume": 3.0}"#).unwrap();
        assert_eq!(partial.master_volume, 1.0);
        assert_eq!(partial.music_volume, 0.7);
        assert!(!partial.muted);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            AudioSettings::from_json("not json"),
            Err(EngineError::SettingsParse(_))
        ));
    }
}
