//! Audio output seam and the single-voice mixing slot.
//!
//! A device callback (or any other render loop) pulls samples out of a
//! [`VoiceSlot`]. The slot holds at most one voice; when that voice runs dry
//! it is removed and its completion callback fires.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::clip::{AudioFormat, SharedClip, SoundClip};
use crate::error::AudioError;

/// Invoked once by the render thread when a clip has been fully played.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Something that can play a clip and report back when it finishes.
pub trait AudioOutput: Send + Sync {
    /// Format the output is actually running at.
    fn format(&self) -> AudioFormat;

    /// Starts playing `clip` from its current position. Returns immediately.
    fn play(&self, clip: SharedClip, on_complete: CompletionCallback) -> Result<(), AudioError>;

    /// Stops rendering. A voice still playing is dropped without completing.
    fn close(&self) {}
}

/// Opens an [`AudioOutput`] for a decoded format.
pub trait AudioBackend: Send + Sync {
    /// `buffer` is the target output latency.
    fn open(&self, format: AudioFormat, buffer: Duration) -> Result<Arc<dyn AudioOutput>, AudioError>;
}

struct Voice {
    clip: SharedClip,
    on_complete: Option<CompletionCallback>,
}

#[derive(Clone, Default)]
pub struct VoiceSlot {
    inner: Arc<Mutex<Option<Voice>>>,
}

impl VoiceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, clip: SharedClip, on_complete: CompletionCallback) -> Result<(), AudioError> {
        let mut slot = self.inner.lock();
        if slot.is_some() {
            return Err(AudioError::OutputBusy);
        }
        *slot = Some(Voice {
            clip,
            on_complete: Some(on_complete),
        });
        Ok(())
    }

    pub fn is_idle(&self) -> bool {
        self.inner.lock().is_none()
    }

    /// Fills `out` (interleaved, `channels` wide) from the current voice.
    ///
    /// Anything not covered by the voice is silence. The completion callback
    /// runs after the slot lock is released.
    pub fn render(&self, out: &mut [f32], channels: usize) {
        let finished = {
            let mut slot = self.inner.lock();
            let Some(voice) = slot.as_mut() else {
                out.fill(0.0);
                return;
            };

            let mut clip = voice.clip.lock();
            let written = mix_into(&mut clip, out, channels);
            out[written * channels..].fill(0.0);
            let done = clip.is_exhausted() || clip.is_closed();
            drop(clip);

            if done {
                slot.take()
            } else {
                None
            }
        };

        if let Some(mut voice) = finished {
            if let Some(on_complete) = voice.on_complete.take() {
                on_complete();
            }
        }
    }

    /// Drops the current voice; its callback never fires.
    pub fn clear(&self) {
        self.inner.lock().take();
    }
}

/// Copies frames from `clip` into `out`, mapping the clip's channel layout
/// onto `channels`. Returns the number of frames written.
pub fn mix_into(clip: &mut SoundClip, out: &mut [f32], channels: usize) -> usize {
    if channels == 0 {
        return 0;
    }

    let mut written = 0;
    for dst in out.chunks_exact_mut(channels) {
        let Some(frame) = clip.next_frame() else {
            break;
        };

        if frame.len() == channels {
            dst.copy_from_slice(frame);
        } else if channels == 1 {
            dst[0] = frame.iter().sum::<f32>() / frame.len() as f32;
        } else {
            for (c, sample) in dst.iter_mut().enumerate() {
                *sample = frame[c.min(frame.len() - 1)];
            }
        }
        written += 1;
    }
    written
}
