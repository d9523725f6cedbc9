//! Sound loading and output.

pub mod clip;
pub mod decoder;
pub mod output;
pub mod resample;
#[cfg(windows)]
pub mod speaker;

pub use clip::{AudioFormat, SharedClip, SoundClip};
pub use decoder::decode_file;
pub use output::{AudioBackend, AudioOutput, CompletionCallback, VoiceSlot};
#[cfg(windows)]
pub use speaker::{DeviceBackend, Speaker};
