//! Error types for shotgunner
//!
//! Each layer gets its own enum so the bootstrap can tell a missing sound file
//! apart from a rejected keyboard hook when it reports the fatal line.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from decoding, seeking and the audio device.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to open audio file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode audio file: {0}")]
    Decode(String),

    #[error("Audio file {0} contains no audio frames")]
    Empty(PathBuf),

    #[error("Audio resource is closed")]
    Closed,

    #[error("Seek to frame {requested} is past the end of the stream ({len} frames)")]
    SeekOutOfRange { requested: usize, len: usize },

    /// The single output voice is still occupied
    #[error("Audio output is already playing")]
    OutputBusy,

    #[error("Audio output error: {0}")]
    Device(String),

    #[error("Audio output is already open in this process")]
    AlreadyOpen,
}

/// Errors surfaced by the playback controller.
///
/// Dropped triggers are not errors; see `TriggerOutcome`.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("A sound is already loaded")]
    AlreadyInitialized,

    #[error("Playback controller has been shut down")]
    Closed,

    /// The output went away before reporting completion
    #[error("Playback was interrupted before completion")]
    Interrupted,

    #[error("Failed to seek audio file: {0}")]
    Rewind(#[source] AudioError),
}

/// Errors from the system-wide keyboard hook.
#[derive(Error, Debug)]
pub enum HookError {
    #[error("A keyboard hook is already active in this process")]
    AlreadyActive,

    #[error("Failed to hook SetWindowsHookEx: {0}")]
    Register(String),
}

/// Errors from reading the optional configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A process-wide slot was claimed twice.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0} is already active in this process")]
pub struct AlreadyClaimed(pub &'static str);

impl From<AlreadyClaimed> for HookError {
    fn from(_: AlreadyClaimed) -> Self {
        HookError::AlreadyActive
    }
}

impl From<AlreadyClaimed> for AudioError {
    fn from(_: AlreadyClaimed) -> Self {
        AudioError::AlreadyOpen
    }
}
