//! Engine state machine
//!
//! Tracks the playback lifecycle across three threads (control, producer,
//! audio callback) through a single atomic, so the callback can branch on
//! state without taking any lock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Playback lifecycle state.
///
/// Transitions:
/// - `Stopped` → `Idle` on engine start
/// - `Idle`/`Armed` → `Playing` once a trigger's first frames reach the
///   ring buffer (not at stage time; see the producer)
/// - `Playing` → `Idle` (autostop) or `Armed` (autostop off) when the ring
///   buffer drains with no loop active
/// - any state → `Stopped` on engine stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EngineState {
    /// No stream open, no threads running
    Stopped = 0,

    /// Stream open, nothing staged or buffered
    Idle = 1,

    /// Stream open and pulling silence after a drain (autostop disabled)
    Armed = 2,

    /// Clip or loop audio is buffered or being staged
    Playing = 3,
}

impl EngineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => EngineState::Idle,
            2 => EngineState::Armed,
            3 => EngineState::Playing,
            _ => EngineState::Stopped,
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Idle => write!(f, "idle"),
            EngineState::Armed => write!(f, "armed"),
            EngineState::Playing => write!(f, "playing"),
        }
    }
}

/// Engine state shared across threads as an atomic.
#[derive(Debug)]
pub struct SharedEngineState {
    state: AtomicU8,
}

impl SharedEngineState {
    pub fn new(initial: EngineState) -> Self {
        Self {
            state: AtomicU8::new(initial as u8),
        }
    }

    pub fn get(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn set(&self, state: EngineState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Transition `from` → `to` only if the state is still `from`.
    ///
    /// Returns true when the transition happened. Used by the audio callback
    /// so a concurrent trigger (which sets `Playing`) wins over a drain
    /// transition racing with it.
    pub fn compare_exchange(&self, from: EngineState, to: EngineState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for SharedEngineState {
    fn default() -> Self {
        Self::new(EngineState::Stopped)
    }
}
