//! Engine configuration
//!
//! All duration-valued settings are expressed in milliseconds and converted
//! to frame counts against a sample rate on demand. The engine tracks its
//! current rate separately (tempo changes replace the rate), so the config
//! itself stays immutable after construction.

use crate::playback::fader::FadeCurve;
use serde::{Deserialize, Serialize};

/// Playback engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base output sample rate in Hz (tempo changes scale from this)
    pub sample_rate: u32,

    /// Requested frames per audio callback
    pub block_size: u32,

    /// Ring buffer capacity in milliseconds of audio
    pub ring_capacity_ms: u32,

    /// Occupancy threshold below which the producer proactively stages the
    /// next loop slice, in milliseconds
    pub low_watermark_ms: u32,

    /// Occupancy ceiling the producer fills the ring up to, in
    /// milliseconds. Keeps the buffered lead bounded so a stop or
    /// retrigger never has more than this much stale audio to discard
    pub high_watermark_ms: u32,

    /// Fade-in length applied to a staged clip (and the first loop slice)
    pub fade_in_ms: u32,

    /// Tail fade length applied to one-shot clips
    pub tail_fade_ms: u32,

    /// Curve shape for both fades
    pub fade_curve: FadeCurve,

    /// When true, the engine returns to `Idle` after a one-shot drains and
    /// fires the playback-ended notification; when false it parks in
    /// `Armed` and keeps the stream pulling silence
    pub autostop_one_shot: bool,

    /// Output device name; `None` selects the system default
    pub device: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_size: 512,
            ring_capacity_ms: 2_000,
            low_watermark_ms: 250,
            high_watermark_ms: 1_500,
            fade_in_ms: 3,
            tail_fade_ms: 3,
            fade_curve: FadeCurve::Linear,
            autostop_one_shot: true,
            device: None,
        }
    }
}

/// Milliseconds to frames at the given rate, truncating.
fn ms_to_frames(ms: u32, sample_rate: u32) -> usize {
    (ms as u64 * sample_rate as u64 / 1000) as usize
}

impl EngineConfig {
    /// Ring buffer capacity in frames at the given rate (at least one block)
    pub fn ring_capacity_frames(&self, sample_rate: u32) -> usize {
        ms_to_frames(self.ring_capacity_ms, sample_rate).max(self.block_size as usize)
    }

    /// Low watermark in frames at the given rate
    pub fn low_watermark_frames(&self, sample_rate: u32) -> usize {
        ms_to_frames(self.low_watermark_ms, sample_rate)
    }

    /// High watermark in frames at the given rate (at least one block, so
    /// a degenerate setting cannot stall staging)
    pub fn high_watermark_frames(&self, sample_rate: u32) -> usize {
        ms_to_frames(self.high_watermark_ms, sample_rate).max(self.block_size as usize)
    }

    /// Fade-in length in frames at the given rate
    pub fn fade_in_frames(&self, sample_rate: u32) -> usize {
        ms_to_frames(self.fade_in_ms, sample_rate)
    }

    /// Tail fade length in frames at the given rate
    pub fn tail_fade_frames(&self, sample_rate: u32) -> usize {
        ms_to_frames(self.tail_fade_ms, sample_rate)
    }
}
