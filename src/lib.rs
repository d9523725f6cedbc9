//! # shotgunner
//!
//! Plays one sound effect whenever a single key is pressed anywhere in the
//! system. A low-level keyboard hook spots the key; a single-slot playback
//! controller makes sure the sound never overlaps itself and rewinds it after
//! every play.

pub mod audio;
pub mod config;
pub mod error;
pub mod guard;
pub mod input;
pub mod logging;
pub mod playback;
pub mod shutdown;

pub use config::Config;
pub use error::{AudioError, ConfigError, HookError, PlaybackError};
pub use input::{KeyEvent, KeyEventKind, TriggerDispatcher, VirtualKey, TRIGGER_KEY};
pub use playback::{PlaybackController, PlaybackState, SkipReason, TriggerOutcome};
