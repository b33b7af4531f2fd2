//! Playback pipeline: commands, producer, ring buffer, engine
//!
//! ## Architecture
//!
//! ```text
//! Control API ──ProducerCommand──▶ producer thread
//!                                       │ stage + fade + write
//!                                       ▼
//!                                StereoRingBuffer
//!                                       │ read + silence-fill
//!                                       ▼
//!                                audio callback (cpal)
//! ```

pub mod command;
pub mod engine;
pub mod fader;
pub mod producer;
pub mod ring_buffer;
pub mod state;

pub use command::{command_channel, CommandReceiver, CommandSender, ProducerCommand};
pub use engine::Engine;
pub use fader::FadeCurve;
pub use ring_buffer::{RingBufferStats, StereoRingBuffer};
pub use state::{EngineState, SharedEngineState};
