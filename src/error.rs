//! Engine error type
//!
//! Gameplay never fails: insufficient energy is a no-op and running out of
//! lives is an ordinary phase change. Errors only come from configuration
//! parsing and from frames that panicked and were isolated by the driver.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse tuning: {0}")]
    TuningParse(#[source] serde_json::Error),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("failed to parse settings: {0}")]
    SettingsParse(#[source] serde_json::Error),

    #[error("frame {frame} panicked: {message}")]
    FramePanic { frame: u64, message: String },
}
