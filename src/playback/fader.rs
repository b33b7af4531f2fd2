//! Fade shaping for staged clips
//!
//! Short fades at clip boundaries avoid audible clicks when playback starts
//! or ends on a non-zero sample. Fades are applied by the producer when a
//! clip is staged, never inside the audio callback.

use crate::audio::types::StereoFrame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fade curve shape applied at clip boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeCurve {
    /// Constant-slope ramp: v(t) = t
    Linear,

    /// Cubic ease: v(t) = t^3 (starts slowly, finishes quickly)
    Exponential,
}

impl FadeCurve {
    /// Evaluate the curve at position t in [0.0, 1.0].
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            FadeCurve::Linear => t,
            FadeCurve::Exponential => t * t * t,
        }
    }
}

impl fmt::Display for FadeCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FadeCurve::Linear => write!(f, "linear"),
            FadeCurve::Exponential => write!(f, "exponential"),
        }
    }
}

impl FromStr for FadeCurve {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(FadeCurve::Linear),
            "exponential" => Ok(FadeCurve::Exponential),
            other => Err(format!("unknown fade curve: {}", other)),
        }
    }
}

/// Apply an ascending fade to the first `fade_frames` frames in place.
///
/// Frame `i` of an `n`-frame fade gets gain `curve((i + 1) / n)`, so a
/// 1-frame fade is not forced to zero. `fade_frames` is clamped to the
/// clip length; a zero-length fade is a no-op.
pub fn apply_fade_in(frames: &mut [StereoFrame], fade_frames: usize, curve: FadeCurve) {
    let n = fade_frames.min(frames.len());
    if n == 0 {
        return;
    }
    for (i, frame) in frames[..n].iter_mut().enumerate() {
        let t = (i + 1) as f32 / n as f32;
        frame.apply_gain(curve.apply(t));
    }
}

/// Apply a descending fade to the last `fade_frames` frames in place.
///
/// Mirror of [`apply_fade_in`]: frame `i` within the faded tail gets gain
/// `curve((n - i) / n)`, descending toward (but not through) zero.
pub fn apply_fade_out(frames: &mut [StereoFrame], fade_frames: usize, curve: FadeCurve) {
    let len = frames.len();
    let n = fade_frames.min(len);
    if n == 0 {
        return;
    }
    for (i, frame) in frames[len - n..].iter_mut().enumerate() {
        let t = (n - i) as f32 / n as f32;
        frame.apply_gain(curve.apply(t));
    }
}

/// Duplicate mono samples to stereo frames without amplitude scaling.
pub fn mono_to_stereo(samples: &[f32]) -> Vec<StereoFrame> {
    samples.iter().map(|&s| StereoFrame::from_mono(s)).collect()
}
