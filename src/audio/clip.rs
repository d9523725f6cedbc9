use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::AudioError;

/// Sample layout of a decoded stream or an output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Number of frames that cover `duration` at this sample rate.
    pub fn frames_in(&self, duration: Duration) -> u32 {
        (self.sample_rate as u128 * duration.as_micros() / 1_000_000) as u32
    }
}

/// Clip shared between the controller and whichever thread renders it.
pub type SharedClip = Arc<Mutex<SoundClip>>;

/// A fully decoded, seekable sound.
///
/// Samples are interleaved `f32`; the position counts frames, not samples.
pub struct SoundClip {
    source: PathBuf,
    format: AudioFormat,
    samples: Vec<f32>,
    position: usize,
    closed: bool,
}

impl SoundClip {
    /// Trailing samples that do not fill a whole frame are discarded.
    pub fn from_samples(source: impl Into<PathBuf>, format: AudioFormat, mut samples: Vec<f32>) -> Self {
        let channels = format.channels.max(1) as usize;
        samples.truncate(samples.len() - samples.len() % channels);
        Self {
            source: source.into(),
            format: AudioFormat::new(format.sample_rate, channels as u16),
            samples,
            position: 0,
            closed: false,
        }
    }

    pub fn into_shared(self) -> SharedClip {
        Arc::new(Mutex::new(self))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Length in frames
    pub fn len(&self) -> usize {
        self.samples.len() / self.format.channels as usize
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn duration(&self) -> Duration {
        if self.format.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.len() as f64 / self.format.sample_rate as f64)
    }

    /// Returns the next frame and advances the position.
    pub fn next_frame(&mut self) -> Option<&[f32]> {
        if self.closed || self.is_exhausted() {
            return None;
        }
        let channels = self.format.channels as usize;
        let start = self.position * channels;
        self.position += 1;
        Some(&self.samples[start..start + channels])
    }

    pub fn seek(&mut self, frame: usize) -> Result<(), AudioError> {
        if self.closed {
            return Err(AudioError::Closed);
        }
        if frame > self.len() {
            return Err(AudioError::SeekOutOfRange {
                requested: frame,
                len: self.len(),
            });
        }
        self.position = frame;
        Ok(())
    }

    /// Releases the sample data. Returns `false` if the clip was already closed.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.samples = Vec::new();
        self.position = 0;
        true
    }

    /// Returns a copy converted to `sample_rate`, positioned at the start.
    pub fn resampled(&self, sample_rate: u32) -> SoundClip {
        let samples = super::resample::resample_linear(
            &self.samples,
            self.format.channels as usize,
            self.format.sample_rate,
            sample_rate,
        );
        SoundClip::from_samples(
            self.source.clone(),
            AudioFormat::new(sample_rate, self.format.channels),
            samples,
        )
    }
}

impl std::fmt::Debug for SoundClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundClip")
            .field("source", &self.source)
            .field("format", &self.format)
            .field("frames", &self.len())
            .field("position", &self.position)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_clip(frames: usize) -> SoundClip {
        let samples = (0..frames * 2).map(|i| i as f32).collect();
        SoundClip::from_samples("test.wav", AudioFormat::new(1000, 2), samples)
    }

    #[test]
    fn reads_every_frame_then_reports_exhausted() {
        let mut clip = stereo_clip(3);
        assert_eq!(clip.len(), 3);
        assert_eq!(clip.next_frame(), Some(&[0.0, 1.0][..]));
        assert_eq!(clip.next_frame(), Some(&[2.0, 3.0][..]));
        assert_eq!(clip.next_frame(), Some(&[4.0, 5.0][..]));
        assert!(clip.is_exhausted());
        assert_eq!(clip.next_frame(), None);
        assert_eq!(clip.position(), 3);
    }

    #[test]
    fn seek_to_start_replays_from_first_frame() {
        let mut clip = stereo_clip(2);
        while clip.next_frame().is_some() {}

        clip.seek(0).unwrap();
        assert_eq!(clip.position(), 0);
        assert_eq!(clip.next_frame(), Some(&[0.0, 1.0][..]));
    }

    #[test]
    fn seek_past_end_is_rejected() {
        let mut clip = stereo_clip(2);
        // Seeking to the end itself is allowed
        clip.seek(2).unwrap();
        assert!(matches!(
            clip.seek(3),
            Err(AudioError::SeekOutOfRange { requested: 3, len: 2 })
        ));
    }

    #[test]
    fn closed_clip_cannot_seek_or_read() {
        let mut clip = stereo_clip(2);
        assert!(clip.close());
        assert!(!clip.close());
        assert!(clip.is_closed());
        assert!(matches!(clip.seek(0), Err(AudioError::Closed)));
        assert_eq!(clip.next_frame(), None);
    }

    #[test]
    fn partial_trailing_frame_is_dropped() {
        let clip = SoundClip::from_samples("odd.wav", AudioFormat::new(1000, 2), vec![0.1, 0.2, 0.3]);
        assert_eq!(clip.len(), 1);
        assert_eq!(clip.samples(), &[0.1, 0.2]);
    }

    #[test]
    fn duration_follows_sample_rate() {
        let clip = stereo_clip(500);
        assert_eq!(clip.duration(), Duration::from_millis(500));
    }

    #[test]
    fn buffer_frames_for_latency_target() {
        let format = AudioFormat::new(44100, 2);
        assert_eq!(format.frames_in(Duration::from_millis(100)), 4410);
        assert_eq!(AudioFormat::new(48000, 1).frames_in(Duration::from_secs(1)), 48000);
    }
}
