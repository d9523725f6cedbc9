//! Single-slot playback of the trigger sound.

mod controller;

pub use controller::{PlaybackController, PlaybackState, SkipReason, TriggerOutcome};
