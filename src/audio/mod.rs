//! Audio output and core data types

pub mod output;
pub mod types;

pub use output::AudioOutput;
pub use types::{StereoClip, StereoFrame};
