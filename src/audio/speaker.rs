//! Default output device playback through cpal.
//!
//! cpal streams are not `Send`, so the stream lives on its own thread for the
//! lifetime of the [`Speaker`]; the device callback renders the shared
//! [`VoiceSlot`].

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, FromSample, SampleFormat, SizedSample, StreamConfig};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::clip::{AudioFormat, SharedClip};
use super::output::{AudioBackend, AudioOutput, CompletionCallback, VoiceSlot};
use crate::error::AudioError;
use crate::guard::{ProcessSlot, SlotClaim};

static AUDIO_OUTPUT: ProcessSlot = ProcessSlot::new("audio output");

/// Opens the system default output device.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceBackend;

impl AudioBackend for DeviceBackend {
    fn open(&self, format: AudioFormat, buffer: Duration) -> Result<Arc<dyn AudioOutput>, AudioError> {
        Ok(Arc::new(Speaker::open(format, buffer)?))
    }
}

pub struct Speaker {
    format: AudioFormat,
    slot: VoiceSlot,
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
    _claim: SlotClaim,
}

impl Speaker {
    /// Opens the default device, preferring `requested`'s sample rate and a
    /// fixed buffer covering `buffer`.
    pub fn open(requested: AudioFormat, buffer: Duration) -> Result<Self, AudioError> {
        let claim = AUDIO_OUTPUT.claim()?;
        let slot = VoiceSlot::new();
        let frames = requested.frames_in(buffer).max(1);

        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let render_slot = slot.clone();

        let worker = thread::Builder::new()
            .name("audio-output".to_string())
            .spawn(move || {
                let stream = match start_stream(&render_slot, requested, frames) {
                    Ok((stream, format)) => {
                        let _ = ready_tx.send(Ok(format));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Parked until close() or the Speaker is dropped
                let _ = stop_rx.recv();
                drop(stream);
                debug!("Audio output stream stopped");
            })
            .map_err(|e| AudioError::Device(format!("failed to spawn audio thread: {}", e)))?;

        let format = match ready_rx.recv() {
            Ok(result) => result?,
            Err(_) => {
                return Err(AudioError::Device(
                    "audio thread exited during setup".to_string(),
                ))
            }
        };

        info!(
            "Audio output ready ({} Hz, {} ch, {} frame buffer)",
            format.sample_rate, format.channels, frames
        );

        Ok(Self {
            format,
            slot,
            stop_tx: Mutex::new(Some(stop_tx)),
            worker: Mutex::new(Some(worker)),
            _claim: claim,
        })
    }
}

impl AudioOutput for Speaker {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn play(&self, clip: SharedClip, on_complete: CompletionCallback) -> Result<(), AudioError> {
        if self.stop_tx.lock().is_none() {
            return Err(AudioError::Closed);
        }
        self.slot.load(clip, on_complete)
    }

    fn close(&self) {
        self.slot.clear();
        if let Some(stop_tx) = self.stop_tx.lock().take() {
            let _ = stop_tx.send(());
        }
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                warn!("Audio output thread panicked");
            }
        }
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builds and starts the output stream. Returns the format actually in use.
fn start_stream(
    slot: &VoiceSlot,
    requested: AudioFormat,
    frames: u32,
) -> Result<(cpal::Stream, AudioFormat), AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| AudioError::Device("no default output device found".to_string()))?;

    let default_config = device
        .default_output_config()
        .map_err(|e| AudioError::Device(format!("failed to get default output config: {}", e)))?;

    // Prefer the file's own rate so no resampling is needed
    let preferred = device.supported_output_configs().ok().and_then(|mut configs| {
        configs.find_map(|range| {
            if range.sample_format() != default_config.sample_format() {
                return None;
            }
            range.try_with_sample_rate(requested.sample_rate)
        })
    });
    let supported = match preferred {
        Some(config) => config,
        None => {
            debug!(
                "Device does not support {} Hz; using {} Hz",
                requested.sample_rate,
                default_config.sample_rate()
            );
            default_config
        }
    };

    let sample_format = supported.sample_format();
    let mut config: StreamConfig = supported.config();
    config.buffer_size = BufferSize::Fixed(frames);

    let stream = match build_stream(&device, &config, sample_format, slot) {
        Ok(stream) => stream,
        Err(e) => {
            debug!("Fixed {} frame buffer rejected ({}); using device default", frames, e);
            config.buffer_size = BufferSize::Default;
            build_stream(&device, &config, sample_format, slot)?
        }
    };

    stream
        .play()
        .map_err(|e| AudioError::Device(format!("failed to start audio stream: {}", e)))?;

    Ok((stream, AudioFormat::new(config.sample_rate, config.channels)))
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    slot: &VoiceSlot,
) -> Result<cpal::Stream, AudioError> {
    match sample_format {
        SampleFormat::F32 => build_typed::<f32>(device, config, slot.clone()),
        SampleFormat::I16 => build_typed::<i16>(device, config, slot.clone()),
        SampleFormat::U16 => build_typed::<u16>(device, config, slot.clone()),
        other => Err(AudioError::Device(format!(
            "unsupported device sample format {:?}",
            other
        ))),
    }
}

fn build_typed<T>(device: &cpal::Device, config: &StreamConfig, slot: VoiceSlot) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                scratch.resize(data.len(), 0.0);
                slot.render(&mut scratch, channels);
                for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
                    *dst = T::from_sample(src);
                }
            },
            |err| warn!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("failed to build audio stream: {}", e)))
}
