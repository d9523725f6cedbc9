use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{info, warn};

use crate::audio::{decode_file, AudioBackend, AudioOutput, SharedClip};
use crate::error::PlaybackError;

/// Lifecycle of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Uninitialized,
    Idle,
    Playing,
    Closed,
}

/// Why a trigger did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotLoaded,
    Closed,
    Busy,
}

/// Result of a trigger that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// One full play-through, rewound afterwards
    Played,
    Skipped(SkipReason),
}

impl TriggerOutcome {
    pub fn played(&self) -> bool {
        matches!(self, TriggerOutcome::Played)
    }
}

struct Slot {
    clip: Option<SharedClip>,
    output: Option<Arc<dyn AudioOutput>>,
    busy: bool,
    closed: bool,
}

/// Owns the one sound and guarantees it never plays over itself.
pub struct PlaybackController {
    backend: Box<dyn AudioBackend>,
    buffer: Duration,
    slot: Mutex<Slot>,
    idle: Condvar,
}

impl PlaybackController {
    /// `buffer` is the output latency target passed to the backend.
    pub fn new(backend: impl AudioBackend + 'static, buffer: Duration) -> Self {
        Self {
            backend: Box::new(backend),
            buffer,
            slot: Mutex::new(Slot {
                clip: None,
                output: None,
                busy: false,
                closed: false,
            }),
            idle: Condvar::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        let slot = self.slot.lock();
        if slot.closed {
            PlaybackState::Closed
        } else if slot.clip.is_none() {
            PlaybackState::Uninitialized
        } else if slot.busy {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    /// Decodes the sound at `path` and opens the output for it.
    pub fn initialize(&self, path: &Path) -> Result<(), PlaybackError> {
        let mut slot = self.slot.lock();
        if slot.closed {
            return Err(PlaybackError::Closed);
        }
        if slot.clip.is_some() {
            return Err(PlaybackError::AlreadyInitialized);
        }

        let mut clip = decode_file(path)?;
        let output = self.backend.open(clip.format(), self.buffer)?;

        let rate = output.format().sample_rate;
        if rate != clip.format().sample_rate {
            info!(
                "Resampling {} from {} Hz to {} Hz",
                path.display(),
                clip.format().sample_rate,
                rate
            );
            clip = clip.resampled(rate);
        }

        info!(
            "Loaded {} ({:.2}s, {} Hz, {} ch)",
            path.display(),
            clip.duration().as_secs_f64(),
            clip.format().sample_rate,
            clip.format().channels
        );

        slot.clip = Some(clip.into_shared());
        slot.output = Some(output);
        Ok(())
    }

    /// Plays the sound once from the start and blocks until it finishes.
    ///
    /// A trigger while another is playing is dropped, not queued.
    pub fn trigger(&self) -> Result<TriggerOutcome, PlaybackError> {
        let (clip, output) = {
            let mut slot = self.slot.lock();
            if slot.closed {
                warn!("Playback is shut down. Skipping.");
                return Ok(TriggerOutcome::Skipped(SkipReason::Closed));
            }
            let (Some(clip), Some(output)) = (slot.clip.clone(), slot.output.clone()) else {
                warn!("No sound loaded. Skipping.");
                return Ok(TriggerOutcome::Skipped(SkipReason::NotLoaded));
            };
            if slot.busy {
                warn!("Sound is already playing. Skipping.");
                return Ok(TriggerOutcome::Skipped(SkipReason::Busy));
            }
            slot.busy = true;
            (clip, output)
        };
        let _busy = BusyGuard { controller: self };

        info!("Starting sound playback");
        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        output.play(
            clip.clone(),
            Box::new(move || {
                let _ = done_tx.send(());
            }),
        )?;

        done_rx.recv().map_err(|_| PlaybackError::Interrupted)?;
        info!("Sound playback completed");

        clip.lock().seek(0).map_err(PlaybackError::Rewind)?;
        Ok(TriggerOutcome::Played)
    }

    /// Waits out any playback in progress, then closes the sound and output.
    pub fn shutdown(&self) {
        let (clip, output) = {
            let mut slot = self.slot.lock();
            while slot.busy {
                self.idle.wait(&mut slot);
            }
            slot.closed = true;
            (slot.clip.take(), slot.output.take())
        };

        if let Some(clip) = clip {
            if clip.lock().close() {
                info!("Sound resource closed");
            }
        }
        if let Some(output) = output {
            output.close();
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state())
            .field("buffer", &self.buffer)
            .finish()
    }
}

/// Releases the busy flag however `trigger` exits.
struct BusyGuard<'a> {
    controller: &'a PlaybackController,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.controller.slot.lock().busy = false;
        self.controller.idle.notify_all();
    }
}
