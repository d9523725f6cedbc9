//! Runtime configuration.
//!
//! Read once at startup from an optional JSON file, then patched from the
//! environment. Nothing is ever written back.

mod types;

pub use types::Config;

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::ConfigError;

pub const APP_DIR: &str = "shotgunner";
pub const CONFIG_FILE: &str = "config.json";

pub const ENV_SOUND: &str = "SHOTGUNNER_SOUND";
pub const ENV_BUFFER_MS: &str = "SHOTGUNNER_BUFFER_MS";

impl Config {
    /// Location of the optional config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads the config file (if any) and applies environment overrides.
    /// Problems are logged and fall back to defaults.
    pub fn load() -> Self {
        let from_file = match Self::config_path() {
            Some(path) => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    warn!("{}; using defaults", e);
                    None
                }
            },
            None => None,
        };

        from_file
            .unwrap_or_default()
            .with_overrides(|key| std::env::var(key).ok())
    }

    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Applies overrides looked up through `lookup` (the environment in
    /// production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(sound) = lookup(ENV_SOUND).filter(|s| !s.trim().is_empty()) {
            self.sound_path = PathBuf::from(sound.trim());
        }
        if let Some(raw) = lookup(ENV_BUFFER_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => self.output_buffer_ms = ms,
                _ => warn!("Ignoring {}={:?}: expected a positive integer", ENV_BUFFER_MS, raw),
            }
        }
        self
    }

    /// Resolves a relative sound path against the working directory, then
    /// the executable's directory.
    pub fn resolve_sound_path(&self) -> PathBuf {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        resolve_against(&self.sound_path, exe_dir.as_deref())
    }
}

fn resolve_against(path: &Path, exe_dir: Option<&Path>) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    if let Some(candidate) = exe_dir.map(|dir| dir.join(path)) {
        if candidate.exists() {
            return candidate;
        }
    }
    path.to_path_buf()
}
