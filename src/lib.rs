//! clipdeck: real-time ring-buffer playback engine for auditioning clips
//! and gapless loop sequences
//!
//! The engine plays fully-rendered stereo audio with hard-cut semantics: a
//! new trigger replaces whatever is sounding, immediately. A producer
//! thread stages clips into a fixed ring buffer; a cpal callback drains it
//! and silence-fills underruns. Loops cycle slice lists gaplessly, fading
//! in only on the very first slice.
//!
//! ```no_run
//! use clipdeck::{Engine, EngineConfig, StereoClip};
//!
//! # fn main() -> clipdeck::Result<()> {
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.start()?;
//! engine.play_one_shot(StereoClip::from_mono(&[0.0; 44_100]))?;
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;

pub use audio::{AudioOutput, StereoClip, StereoFrame};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use playback::{Engine, EngineState, FadeCurve};
