//! Core audio data types
//!
//! Defines the frame and clip structures used throughout the playback pipeline.

/// StereoFrame represents a single stereo sample (one frame of audio).
///
/// Used for passing audio data between the producer, ring buffer, and output device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoFrame {
    /// Left channel sample
    pub left: f32,

    /// Right channel sample
    pub right: f32,
}

impl StereoFrame {
    /// Create a silent frame (0.0, 0.0)
    pub fn zero() -> Self {
        StereoFrame { left: 0.0, right: 0.0 }
    }

    /// Create a frame from a mono sample (duplicate to both channels,
    /// no amplitude scaling)
    pub fn from_mono(sample: f32) -> Self {
        StereoFrame { left: sample, right: sample }
    }

    /// Create a frame from left and right samples
    pub fn from_stereo(left: f32, right: f32) -> Self {
        StereoFrame { left, right }
    }

    /// Apply gain scaling to both channels
    pub fn apply_gain(&mut self, gain: f32) {
        self.left *= gain;
        self.right *= gain;
    }

    /// Clamp samples to valid range [-1.0, 1.0] to prevent clipping
    pub fn clamp(&mut self) {
        self.left = self.left.clamp(-1.0, 1.0);
        self.right = self.right.clamp(-1.0, 1.0);
    }
}

/// StereoClip holds fully-rendered audio ready to be staged for playback.
///
/// **Format:**
/// - Samples are f32 (floating point -1.0 to 1.0)
/// - One StereoFrame per sample period
/// - Frames are interpreted at whatever rate the output stream runs at
#[derive(Debug, Clone)]
pub struct StereoClip {
    /// PCM audio frames
    pub frames: Vec<StereoFrame>,
}

impl StereoClip {
    /// Create a clip from pre-built stereo frames
    pub fn new(frames: Vec<StereoFrame>) -> Self {
        Self { frames }
    }

    /// Create a clip from a mono sample buffer.
    ///
    /// Each sample is duplicated to both channels without amplitude scaling,
    /// so a full-scale mono signal stays full-scale per channel.
    pub fn from_mono(samples: &[f32]) -> Self {
        Self {
            frames: samples.iter().map(|&s| StereoFrame::from_mono(s)).collect(),
        }
    }

    /// Create a clip from interleaved stereo samples [L, R, L, R, ...].
    ///
    /// A trailing unpaired sample is dropped.
    pub fn from_interleaved(samples: &[f32]) -> Self {
        Self {
            frames: samples
                .chunks_exact(2)
                .map(|pair| StereoFrame::from_stereo(pair[0], pair[1]))
                .collect(),
        }
    }

    /// Number of stereo frames in the clip
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if the clip contains no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Duration in milliseconds at the given sample rate
    pub fn duration_ms(&self, sample_rate: u32) -> u64 {
        (self.frames.len() as u64 * 1000) / sample_rate.max(1) as u64
    }
}

impl From<Vec<f32>> for StereoClip {
    /// Mono samples, duplicated to both channels
    fn from(samples: Vec<f32>) -> Self {
        StereoClip::from_mono(&samples)
    }
}

impl From<Vec<StereoFrame>> for StereoClip {
    fn from(frames: Vec<StereoFrame>) -> Self {
        StereoClip::new(frames)
    }
}
