//! Commands sent from the control API to the producer thread
//!
//! All playback triggers travel over a crossbeam channel so the control
//! side never touches producer-owned state directly. Sends are non-blocking;
//! the producer drains the channel once per loop iteration.

use crate::audio::types::StereoClip;
use crossbeam_channel::{Receiver, Sender};

/// Command processed by the producer thread.
#[derive(Debug)]
pub enum ProducerCommand {
    /// Hard-cut to a single clip: clear the ring buffer, drop any active
    /// loop, and stage this clip from the start.
    PlayOneShot {
        /// Fully-rendered clip to stage
        clip: StereoClip,
    },

    /// Hard-cut to a gapless loop over the given slices, cycling
    /// first-to-last indefinitely until stopped or replaced.
    StartLoop {
        /// Slices played in order, wrapping around
        slices: Vec<StereoClip>,
    },

    /// Stop playback immediately: clear the ring buffer and drop all
    /// staged and looping audio. The stream keeps running silent.
    Stop,

    /// Tempo change request. Ignored while audio is playing; otherwise the
    /// producer clears any stale buffered audio so the next trigger starts
    /// clean at the new rate.
    SetTempo {
        /// Requested tempo in beats per minute
        target_bpm: f32,

        /// Tempo the source material was rendered at
        source_bpm: f32,
    },
}

/// Sending half of the command channel (held by the engine)
pub type CommandSender = Sender<ProducerCommand>;

/// Receiving half of the command channel (owned by the producer thread)
pub type CommandReceiver = Receiver<ProducerCommand>;

/// Create the command channel.
///
/// Unbounded so control-side sends never block; command volume is human
/// trigger rates, not audio rates.
pub fn command_channel() -> (CommandSender, CommandReceiver) {
    crossbeam_channel::unbounded()
}
