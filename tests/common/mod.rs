//! Shared helpers for integration tests.
//!
//! `PacedBackend` stands in for the sound card: a render thread drains a
//! `VoiceSlot` in real time so playback takes as long as the clip.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use shotgunner::audio::{AudioBackend, AudioFormat, AudioOutput, CompletionCallback, SharedClip, VoiceSlot};
use shotgunner::AudioError;

const TICK: Duration = Duration::from_millis(10);

/// Opens `PacedOutput`s, optionally at a fixed device rate.
#[derive(Clone, Default)]
pub struct PacedBackend {
    pub device_rate: Option<u32>,
    pub opened: Arc<AtomicUsize>,
    pub plays: Arc<AtomicUsize>,
    pub closed: Arc<AtomicBool>,
}

impl PacedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_rate(rate: u32) -> Self {
        Self {
            device_rate: Some(rate),
            ..Self::default()
        }
    }
}

impl AudioBackend for PacedBackend {
    fn open(&self, format: AudioFormat, _buffer: Duration) -> Result<Arc<dyn AudioOutput>, AudioError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let format = AudioFormat::new(self.device_rate.unwrap_or(format.sample_rate), format.channels);
        Ok(Arc::new(PacedOutput::start(format, self.plays.clone(), self.closed.clone())))
    }
}

pub struct PacedOutput {
    format: AudioFormat,
    slot: VoiceSlot,
    plays: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl PacedOutput {
    fn start(format: AudioFormat, plays: Arc<AtomicUsize>, closed: Arc<AtomicBool>) -> Self {
        let slot = VoiceSlot::new();
        let render_slot = slot.clone();
        let stop = closed.clone();
        let channels = format.channels as usize;
        let frames = format.frames_in(TICK).max(1) as usize;

        thread::spawn(move || {
            let mut buf = vec![0.0f32; frames * channels];
            while !stop.load(Ordering::SeqCst) {
                render_slot.render(&mut buf, channels);
                thread::sleep(TICK);
            }
        });

        Self {
            format,
            slot,
            plays,
            closed,
        }
    }
}

impl AudioOutput for PacedOutput {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn play(&self, clip: SharedClip, on_complete: CompletionCallback) -> Result<(), AudioError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AudioError::Closed);
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        self.slot.load(clip, on_complete)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.slot.clear();
    }
}

/// Output that accepts a clip and then loses it without ever completing.
#[derive(Clone, Default)]
pub struct DroppingBackend;

struct DroppingOutput(AudioFormat);

impl AudioBackend for DroppingBackend {
    fn open(&self, format: AudioFormat, _buffer: Duration) -> Result<Arc<dyn AudioOutput>, AudioError> {
        Ok(Arc::new(DroppingOutput(format)))
    }
}

impl AudioOutput for DroppingOutput {
    fn format(&self) -> AudioFormat {
        self.0
    }

    fn play(&self, _clip: SharedClip, on_complete: CompletionCallback) -> Result<(), AudioError> {
        drop(on_complete);
        Ok(())
    }
}

/// Backend whose device never opens.
#[derive(Clone, Default)]
pub struct MissingDeviceBackend;

impl AudioBackend for MissingDeviceBackend {
    fn open(&self, _format: AudioFormat, _buffer: Duration) -> Result<Arc<dyn AudioOutput>, AudioError> {
        Err(AudioError::Device("no output device available".to_string()))
    }
}

/// Writes a 16-bit mono WAV of `duration` filled with a quiet square wave.
pub fn write_wav(dir: &Path, name: &str, sample_rate: u32, duration: Duration) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let frames = (sample_rate as u128 * duration.as_millis() / 1000) as u32;
    for i in 0..frames {
        let sample: i16 = if (i / 20) % 2 == 0 { 4000 } else { -4000 };
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
    path
}
