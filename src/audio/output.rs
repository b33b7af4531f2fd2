//! Audio output using cpal
//!
//! Manages the output device and stream. The engine supplies a block
//! callback that fills `StereoFrame` slices; this module adapts it to
//! whatever sample format and channel count the device wants, applying
//! master gain and clamping on the way out.

use crate::audio::types::StereoFrame;
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Upper bound on frames handled per format-adapter pass. Larger device
/// blocks are processed in chunks so the scratch block never reallocates.
const MAX_BLOCK_FRAMES: usize = 8192;

/// Block callback supplied by the engine. Invoked on the real-time audio
/// thread; must fill the whole slice and never block.
pub type BlockCallback = dyn FnMut(&mut [StereoFrame]) + Send + 'static;

/// Audio output manager using cpal.
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    gain: Arc<Mutex<f32>>,
    /// Stream error flag, set by the cpal error callback
    error_flag: Arc<AtomicBool>,
}

impl AudioOutput {
    /// List available audio output devices.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open an audio device for output.
    ///
    /// # Arguments
    /// - `device_name`: Optional device name (None = default device)
    /// - `sample_rate`: Requested output rate in Hz
    /// - `block_size`: Requested frames per callback
    /// - `gain`: Shared master gain applied in the callback
    ///
    /// # Fallback Behavior
    /// If the requested device is not found, falls back to the default
    /// device with a warning. If no stereo config exists at the requested
    /// rate, falls back to the device default config.
    pub fn new(
        device_name: Option<String>,
        sample_rate: u32,
        block_size: u32,
        gain: Arc<Mutex<f32>>,
    ) -> Result<Self> {
        let host = cpal::default_host();

        let device = if let Some(name) = device_name.as_ref() {
            let mut devices = host
                .output_devices()
                .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?;

            match devices.find(|d| d.name().ok().as_ref() == Some(name)) {
                Some(dev) => {
                    info!("Found requested audio device: {}", name);
                    dev
                }
                None => {
                    warn!(
                        "Requested device '{}' not found, falling back to default device",
                        name
                    );

                    let default_dev = host.default_output_device().ok_or_else(|| {
                        Error::AudioOutput(format!(
                            "Device '{}' not found and no default device available",
                            name
                        ))
                    })?;

                    info!(
                        "Using default audio device as fallback: {}",
                        default_dev.name().unwrap_or_else(|_| "Unknown".to_string())
                    );
                    default_dev
                }
            }
        } else {
            let dev = host
                .default_output_device()
                .ok_or_else(|| Error::AudioOutput("No default output device found".to_string()))?;

            info!(
                "Using default audio device: {}",
                dev.name().unwrap_or_else(|_| "Unknown".to_string())
            );
            dev
        };

        let (mut config, sample_format) = Self::get_best_config(&device, sample_rate)?;
        config.buffer_size = cpal::BufferSize::Fixed(block_size);

        debug!(
            "Audio config: sample_rate={}, channels={}, format={:?}, buffer_size={:?}",
            config.sample_rate.0, config.channels, sample_format, config.buffer_size
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            gain,
            error_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get the best supported configuration for playback.
    ///
    /// Prefers stereo f32 at the requested rate (matching the internal
    /// format), falling back to the device default.
    fn get_best_config(device: &Device, sample_rate: u32) -> Result<(StreamConfig, SampleFormat)> {
        let mut supported_configs = device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?;

        let preferred = supported_configs.find(|config| {
            config.channels() == 2
                && config.min_sample_rate().0 <= sample_rate
                && config.max_sample_rate().0 >= sample_rate
                && config.sample_format() == SampleFormat::F32
        });

        if let Some(supported_config) = preferred {
            let sample_format = supported_config.sample_format();
            let config = supported_config
                .with_sample_rate(cpal::SampleRate(sample_rate))
                .config();
            return Ok((config, sample_format));
        }

        warn!(
            "No stereo f32 config at {} Hz, falling back to device default",
            sample_rate
        );
        let supported_config = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("Failed to get default config: {}", e)))?;

        let sample_format = supported_config.sample_format();
        let config = supported_config.config();
        Ok((config, sample_format))
    }

    /// Start playback with the given block callback.
    ///
    /// The callback is invoked on the real-time audio thread with a scratch
    /// slice of up to `MAX_BLOCK_FRAMES` frames per pass; it must fill the
    /// whole slice (silence included) without blocking or allocating.
    pub fn start<F>(&mut self, callback: F) -> Result<()>
    where
        F: FnMut(&mut [StereoFrame]) + Send + 'static,
    {
        info!("Starting audio stream");

        let callback: Arc<Mutex<BlockCallback>> = Arc::new(Mutex::new(callback));

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream_f32(callback)?,
            SampleFormat::I16 => self.build_stream_i16(callback)?,
            SampleFormat::U16 => self.build_stream_u16(callback)?,
            sample_format => {
                return Err(Error::AudioOutput(format!(
                    "Unsupported sample format: {:?}",
                    sample_format
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        self.stream = Some(stream);

        info!("Audio stream started successfully");
        Ok(())
    }

    /// Build an output stream for f32 samples
    fn build_stream_f32(&self, callback: Arc<Mutex<BlockCallback>>) -> Result<Stream> {
        let channels = self.config.channels as usize;
        let gain = Arc::clone(&self.gain);
        let error_flag = Arc::clone(&self.error_flag);
        let mut scratch = vec![StereoFrame::zero(); MAX_BLOCK_FRAMES];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut callback = callback.lock().unwrap();
                    let current_gain = *gain.lock().unwrap();

                    for chunk in data.chunks_mut(MAX_BLOCK_FRAMES * channels) {
                        let frames = chunk.len() / channels;
                        let block = &mut scratch[..frames];
                        callback(block);

                        for (frame, out) in block.iter().zip(chunk.chunks_mut(channels)) {
                            out[0] = (frame.left * current_gain).clamp(-1.0, 1.0);
                            if channels > 1 {
                                out[1] = (frame.right * current_gain).clamp(-1.0, 1.0);
                            }
                            for extra in out.iter_mut().skip(2) {
                                *extra = 0.0;
                            }
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }

    /// Build an output stream for i16 samples
    fn build_stream_i16(&self, callback: Arc<Mutex<BlockCallback>>) -> Result<Stream> {
        let channels = self.config.channels as usize;
        let gain = Arc::clone(&self.gain);
        let error_flag = Arc::clone(&self.error_flag);
        let mut scratch = vec![StereoFrame::zero(); MAX_BLOCK_FRAMES];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let mut callback = callback.lock().unwrap();
                    let current_gain = *gain.lock().unwrap();

                    for chunk in data.chunks_mut(MAX_BLOCK_FRAMES * channels) {
                        let frames = chunk.len() / channels;
                        let block = &mut scratch[..frames];
                        callback(block);

                        for (frame, out) in block.iter().zip(chunk.chunks_mut(channels)) {
                            let left = (frame.left * current_gain).clamp(-1.0, 1.0);
                            let right = (frame.right * current_gain).clamp(-1.0, 1.0);

                            out[0] = (left * i16::MAX as f32) as i16;
                            if channels > 1 {
                                out[1] = (right * i16::MAX as f32) as i16;
                            }
                            for extra in out.iter_mut().skip(2) {
                                *extra = 0;
                            }
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }

    /// Build an output stream for u16 samples
    fn build_stream_u16(&self, callback: Arc<Mutex<BlockCallback>>) -> Result<Stream> {
        let channels = self.config.channels as usize;
        let gain = Arc::clone(&self.gain);
        let error_flag = Arc::clone(&self.error_flag);
        let mut scratch = vec![StereoFrame::zero(); MAX_BLOCK_FRAMES];

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                    let mut callback = callback.lock().unwrap();
                    let current_gain = *gain.lock().unwrap();

                    for chunk in data.chunks_mut(MAX_BLOCK_FRAMES * channels) {
                        let frames = chunk.len() / channels;
                        let block = &mut scratch[..frames];
                        callback(block);

                        for (frame, out) in block.iter().zip(chunk.chunks_mut(channels)) {
                            let left = (frame.left * current_gain).clamp(-1.0, 1.0);
                            let right = (frame.right * current_gain).clamp(-1.0, 1.0);

                            // Convert from [-1.0, 1.0] to [0, 65535]
                            out[0] = ((left + 1.0) * 32767.5) as u16;
                            if channels > 1 {
                                out[1] = ((right + 1.0) * 32767.5) as u16;
                            }
                            for extra in out.iter_mut().skip(2) {
                                *extra = 32768;
                            }
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    error_flag.store(true, Ordering::SeqCst);
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

        Ok(stream)
    }

    /// Stop audio playback and drop the stream.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            info!("Stopping audio stream");
            stream
                .pause()
                .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
            drop(stream);
        }

        Ok(())
    }

    /// Get device name.
    pub fn device_name(&self) -> String {
        self.device.name().unwrap_or_else(|_| "Unknown".to_string())
    }

    /// Get the actual stream sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Get channel count.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// True if the cpal error callback has flagged a stream error.
    pub fn has_error(&self) -> bool {
        self.error_flag.load(Ordering::SeqCst)
    }

    /// Clear the stream error flag.
    pub fn clear_error(&self) {
        self.error_flag.store(false, Ordering::SeqCst);
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        // Ensure the stream is stopped on drop
        let _ = self.stop();
    }
}
