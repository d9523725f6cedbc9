//! Core configuration record.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// --- CONSTANTS ---
pub const DEFAULT_SOUND: &str = "shotgun_1.mp3";
pub const DEFAULT_BUFFER_MS: u64 = 100;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Sound played on every trigger
    #[serde(default = "default_sound_path")]
    pub sound_path: PathBuf,
    /// Output latency target
    #[serde(default = "default_buffer_ms")]
    pub output_buffer_ms: u64,
    /// Wait for Enter before the console closes
    #[serde(default = "default_true")]
    pub pause_on_exit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sound_path: default_sound_path(),
            output_buffer_ms: default_buffer_ms(),
            pause_on_exit: true,
        }
    }
}

impl Config {
    pub fn output_buffer(&self) -> Duration {
        Duration::from_millis(self.output_buffer_ms)
    }
}

pub fn default_sound_path() -> PathBuf {
    PathBuf::from(DEFAULT_SOUND)
}
pub fn default_buffer_ms() -> u64 {
    DEFAULT_BUFFER_MS
}
pub fn default_true() -> bool {
    true
}
