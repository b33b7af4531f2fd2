//! Producer thread: command processing and ring buffer top-up
//!
//! The producer owns all staging state (the active loop slice list, the
//! slice cursor, and the partially-written staged clip). The control API
//! only ever talks to it through the command channel, and the audio
//! callback only ever sees the ring buffer and a few shared atomics, so
//! neither side can stall the other.

use crate::audio::types::{StereoClip, StereoFrame};
use crate::config::EngineConfig;
use crate::playback::command::{CommandReceiver, ProducerCommand};
use crate::playback::fader::{apply_fade_in, apply_fade_out};
use crate::playback::ring_buffer::StereoRingBuffer;
use crate::playback::state::{EngineState, SharedEngineState};
use crossbeam_channel::TryRecvError;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Poll interval for the producer loop
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Callback invoked (off the real-time thread) when an autostop one-shot
/// finishes draining. Shared as an Arc so dispatch can run it without
/// holding the registration lock.
pub type EndedCallback = Arc<dyn Fn() + Send + Sync>;

/// Handles shared between the engine, the producer thread, and the audio
/// callback.
#[derive(Clone)]
pub struct ProducerShared {
    /// Frame buffer between producer and callback
    pub ring: Arc<StereoRingBuffer>,

    /// Engine lifecycle state
    pub state: Arc<SharedEngineState>,

    /// Mirrors whether a loop is active, readable by the callback without
    /// touching producer-owned slice state
    pub loop_active: Arc<AtomicBool>,

    /// Set by the callback when an autostop one-shot drains; the producer
    /// clears it and dispatches the ended callback
    pub drain_pending: Arc<AtomicBool>,

    /// Registered playback-ended notification
    pub ended_callback: Arc<Mutex<Option<EndedCallback>>>,

    /// Current output sample rate (tempo changes replace it)
    pub current_sample_rate: Arc<AtomicU32>,

    /// Lifetime underrun/drain counter, incremented by the callback
    pub underruns: Arc<AtomicU64>,

    /// Shutdown request from the engine
    pub stop_flag: Arc<AtomicBool>,
}

/// Clip currently being written into the ring buffer
struct Staged {
    frames: Vec<StereoFrame>,
    offset: usize,
}

struct Producer {
    config: EngineConfig,
    shared: ProducerShared,

    /// Active loop slice list (empty when not looping)
    slices: Vec<StereoClip>,

    /// Next slice index, cycling with wraparound
    next_slice: usize,

    looping: bool,
    staged: Option<Staged>,

    /// A trigger has been staged but none of its frames have reached the
    /// ring yet. `Playing` is published only once the first frames land,
    /// so the callback's end-of-audio detection cannot misread the
    /// stage-to-write gap as a drain.
    trigger_pending: bool,

    /// Underrun count already reported, for change-triggered logging
    logged_underruns: u64,
}

impl Producer {
    fn new(config: EngineConfig, shared: ProducerShared) -> Self {
        Self {
            config,
            shared,
            slices: Vec::new(),
            next_slice: 0,
            looping: false,
            staged: None,
            trigger_pending: false,
            logged_underruns: 0,
        }
    }

    fn current_rate(&self) -> u32 {
        self.shared.current_sample_rate.load(Ordering::Acquire)
    }

    /// Apply one command from the control side.
    fn apply(&mut self, command: ProducerCommand) {
        match command {
            ProducerCommand::PlayOneShot { clip } => self.stage_one_shot(clip),
            ProducerCommand::StartLoop { slices } => self.start_loop(slices),
            ProducerCommand::Stop => self.stop_playback(),
            ProducerCommand::SetTempo {
                target_bpm,
                source_bpm,
            } => {
                // Guarded again here even though the engine already rejects
                // tempo changes while playing: a trigger may have landed
                // between the engine's check and this command. A staged but
                // not-yet-written trigger counts as playing for this check.
                if self.shared.state.get() == EngineState::Playing || self.trigger_pending {
                    debug!(
                        "Tempo change {:.1} -> {:.1} BPM ignored while playing",
                        source_bpm, target_bpm
                    );
                } else {
                    self.shared.ring.clear();
                    trace!(
                        "Tempo change applied: {:.1} -> {:.1} BPM, buffer cleared",
                        source_bpm,
                        target_bpm
                    );
                }
            }
        }
    }

    /// Hard-cut to a single clip.
    fn stage_one_shot(&mut self, clip: StereoClip) {
        if clip.is_empty() {
            warn!("Dropping one-shot trigger with empty clip");
            return;
        }

        self.hard_cut();

        let rate = self.current_rate();
        let mut frames = clip.frames;
        apply_fade_in(
            &mut frames,
            self.config.fade_in_frames(rate),
            self.config.fade_curve,
        );
        apply_fade_out(
            &mut frames,
            self.config.tail_fade_frames(rate),
            self.config.fade_curve,
        );

        debug!(
            "Staging one-shot clip: {} frames ({} ms @ {} Hz)",
            frames.len(),
            frames.len() as u64 * 1000 / rate.max(1) as u64,
            rate
        );
        self.staged = Some(Staged { frames, offset: 0 });
        self.trigger_pending = true;
    }

    /// Hard-cut to a gapless loop over `slices`.
    fn start_loop(&mut self, slices: Vec<StereoClip>) {
        if slices.is_empty() || slices.iter().any(|s| s.is_empty()) {
            warn!("Dropping loop trigger with empty slice list or empty slice");
            return;
        }

        self.hard_cut();

        debug!(
            "Starting loop: {} slices, {} frames total",
            slices.len(),
            slices.iter().map(|s| s.len()).sum::<usize>()
        );
        self.slices = slices;
        self.next_slice = 0;
        self.looping = true;
        self.shared.loop_active.store(true, Ordering::Release);

        // Fade-in only on the very first slice; continuations butt-join
        self.stage_next_slice(true);
        self.trigger_pending = true;
    }

    /// Stop command: silence immediately, stream keeps running.
    /// `hard_cut` already leaves the state at `Idle`.
    fn stop_playback(&mut self) {
        debug!("Stop command: clearing staged and buffered audio");
        self.hard_cut();
    }

    /// Clear everything a previous trigger may have left behind.
    ///
    /// Drops the state to `Idle` before (not after) the ring is emptied:
    /// the callback must never observe `Playing` with an empty ring during
    /// a retrigger, or it would flag a drain for a clip that is about to
    /// start.
    fn hard_cut(&mut self) {
        self.shared.state.set(EngineState::Idle);
        self.shared.ring.clear();
        self.staged = None;
        self.slices.clear();
        self.next_slice = 0;
        self.looping = false;
        self.trigger_pending = false;
        self.shared.loop_active.store(false, Ordering::Release);
        // A stale ended notification from the replaced clip must not fire
        self.shared.drain_pending.store(false, Ordering::Release);
    }

    /// Stage the next loop slice, cycling with wraparound.
    fn stage_next_slice(&mut self, fade_first: bool) {
        if self.slices.is_empty() {
            warn!("Loop active with no slices; dropping loop");
            self.looping = false;
            self.shared.loop_active.store(false, Ordering::Release);
            return;
        }

        let idx = self.next_slice;
        let mut frames = self.slices[idx].frames.clone();
        self.next_slice = (idx + 1) % self.slices.len();

        if fade_first {
            let rate = self.current_rate();
            apply_fade_in(
                &mut frames,
                self.config.fade_in_frames(rate),
                self.config.fade_curve,
            );
        }
        trace!("Staged loop slice {} ({} frames)", idx, frames.len());
        self.staged = Some(Staged { frames, offset: 0 });
    }

    /// Write staged audio up to the high watermark; restage on completion.
    fn pump(&mut self) {
        let high = self.config.high_watermark_frames(self.current_rate());
        let headroom = high.saturating_sub(self.shared.ring.occupied());

        let mut completed = false;
        let mut first_write = false;
        if let Some(staged) = self.staged.as_mut() {
            let remaining = staged.frames.len() - staged.offset;
            let wanted = remaining.min(headroom);
            if wanted > 0 {
                let was_start = staged.offset == 0;
                let written = self
                    .shared
                    .ring
                    .write(&staged.frames[staged.offset..staged.offset + wanted]);
                staged.offset += written;
                first_write = was_start && written > 0;
            }
            completed = staged.offset >= staged.frames.len();
        }
        // Publish `Playing` only once audible frames are actually in the
        // ring. Publishing at stage time would open a window where the
        // callback sees `Playing` over an empty ring and misreads the gap
        // as the clip draining out.
        if first_write && self.trigger_pending {
            self.trigger_pending = false;
            self.shared.drain_pending.store(false, Ordering::Release);
            self.shared.state.set(EngineState::Playing);
        }

        if completed {
            self.staged = None;
            if self.looping {
                self.stage_next_slice(false);
            }
        }

        // Watermark refill: keep the loop ahead of the callback
        if self.staged.is_none()
            && self.looping
            && self.shared.ring.occupied()
                < self.config.low_watermark_frames(self.current_rate())
        {
            self.stage_next_slice(false);
        }
    }

    /// Dispatch the playback-ended notification if the callback flagged a
    /// completed autostop one-shot. Runs on this thread, never in the
    /// real-time callback.
    fn dispatch_ended(&self) {
        if self.shared.drain_pending.swap(false, Ordering::AcqRel) {
            trace!("Dispatching playback-ended notification");
            // Clone the handler out of the lock before invoking it, so a
            // callback that re-registers itself does not deadlock.
            let callback = self
                .shared
                .ended_callback
                .lock()
                .unwrap()
                .as_ref()
                .map(Arc::clone);
            if let Some(callback) = callback {
                callback();
            }
        }
    }

    /// Change-triggered underrun reporting. Drains at the natural end of a
    /// one-shot are expected; underruns while looping mean the producer
    /// fell behind and deserve a warning.
    fn report_underruns(&mut self) {
        let count = self.shared.underruns.load(Ordering::Relaxed);
        if count != self.logged_underruns {
            let new = count - self.logged_underruns;
            if self.looping {
                warn!(
                    "Ring buffer underrun while looping ({} new, {} lifetime)",
                    new, count
                );
            } else {
                trace!("Playback drained ({} lifetime underruns)", count);
            }
            self.logged_underruns = count;
        }
    }
}

/// Producer thread entry point. Runs until the stop flag is set or the
/// command channel disconnects.
pub fn run_producer(commands: CommandReceiver, config: EngineConfig, shared: ProducerShared) {
    debug!("Producer thread started");
    let mut producer = Producer::new(config, shared);

    while !producer.shared.stop_flag.load(Ordering::Acquire) {
        loop {
            match commands.try_recv() {
                Ok(command) => producer.apply(command),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!("Command channel closed; producer thread exiting");
                    return;
                }
            }
        }

        producer.pump();
        producer.dispatch_ended();
        producer.report_underruns();

        thread::sleep(POLL_INTERVAL);
    }

    debug!("Producer thread stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::fader::FadeCurve;

    fn shared_with_ring(capacity: usize) -> ProducerShared {
        ProducerShared {
            ring: Arc::new(StereoRingBuffer::new(capacity)),
            state: Arc::new(SharedEngineState::new(EngineState::Idle)),
            loop_active: Arc::new(AtomicBool::new(false)),
            drain_pending: Arc::new(AtomicBool::new(false)),
            ended_callback: Arc::new(Mutex::new(None)),
            current_sample_rate: Arc::new(AtomicU32::new(44_100)),
            underruns: Arc::new(AtomicU64::new(0)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    fn no_fade_config() -> EngineConfig {
        EngineConfig {
            fade_in_ms: 0,
            tail_fade_ms: 0,
            ..Default::default()
        }
    }

    fn read_all(ring: &StereoRingBuffer) -> Vec<StereoFrame> {
        let mut out = vec![StereoFrame::zero(); ring.occupied()];
        let n = ring.read(&mut out);
        out.truncate(n);
        out
    }

    #[test]
    fn test_one_shot_staged_and_written() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 100]),
        });
        // Not playing yet: no frames have reached the ring
        assert_eq!(shared.state.get(), EngineState::Idle);

        producer.pump();
        assert_eq!(shared.state.get(), EngineState::Playing);
        assert_eq!(shared.ring.occupied(), 100);
        assert!(producer.staged.is_none());
        let frames = read_all(&shared.ring);
        assert!(frames.iter().all(|f| f.left == 0.5 && f.right == 0.5));
    }

    #[test]
    fn test_one_shot_fades_applied() {
        let shared = shared_with_ring(8192);
        let config = EngineConfig {
            fade_in_ms: 1,
            tail_fade_ms: 1,
            fade_curve: FadeCurve::Linear,
            ..Default::default()
        };
        // 1 ms at 44.1 kHz = 44 frames
        let fade = config.fade_in_frames(44_100);
        assert_eq!(fade, 44);

        let mut producer = Producer::new(config, shared.clone());
        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[1.0; 1000]),
        });
        producer.pump();

        let frames = read_all(&shared.ring);
        assert_eq!(frames.len(), 1000);
        // Head ramps up, body is untouched, tail ramps down
        assert!(frames[0].left < 0.05);
        assert!(frames[fade - 1].left > 0.99);
        assert_eq!(frames[500].left, 1.0);
        assert!(frames[999].left < 0.05);
    }

    #[test]
    fn test_empty_one_shot_dropped() {
        let shared = shared_with_ring(64);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::new(Vec::new()),
        });
        producer.pump();
        assert!(shared.ring.is_empty());
        assert_eq!(shared.state.get(), EngineState::Idle);
    }

    #[test]
    fn test_hard_cut_second_trigger_wins() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.25; 200]),
        });
        producer.pump();
        assert_eq!(shared.ring.occupied(), 200);

        // Second trigger before the first has been consumed
        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.75; 50]),
        });
        producer.pump();

        let frames = read_all(&shared.ring);
        assert_eq!(frames.len(), 50);
        assert!(frames.iter().all(|f| f.left == 0.75));
    }

    #[test]
    fn test_loop_cycles_slices_in_order() {
        let shared = shared_with_ring(4096);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::StartLoop {
            slices: vec![
                StereoClip::from_mono(&[0.1; 10]),
                StereoClip::from_mono(&[0.2; 10]),
            ],
        });
        assert!(shared.loop_active.load(Ordering::Acquire));

        // Pump enough to lay down several cycles
        for _ in 0..10 {
            producer.pump();
        }
        assert_eq!(shared.state.get(), EngineState::Playing);

        let frames = read_all(&shared.ring);
        assert!(frames.len() >= 40);
        // Gapless A B A B pattern, no fades between repeats
        for (i, frame) in frames.iter().enumerate() {
            let expected = if (i / 10) % 2 == 0 { 0.1 } else { 0.2 };
            assert_eq!(frame.left, expected, "frame {}", i);
        }
    }

    #[test]
    fn test_loop_fade_only_on_first_slice() {
        let shared = shared_with_ring(8192);
        let config = EngineConfig {
            fade_in_ms: 1,
            tail_fade_ms: 0,
            ..Default::default()
        };
        let fade = config.fade_in_frames(44_100);
        let mut producer = Producer::new(config, shared.clone());

        producer.apply(ProducerCommand::StartLoop {
            slices: vec![StereoClip::from_mono(&[1.0; 100])],
        });
        for _ in 0..5 {
            producer.pump();
        }

        let frames = read_all(&shared.ring);
        assert!(frames.len() >= 300);
        // First pass ramps in
        assert!(frames[0].left < 0.05);
        assert!(frames[fade].left == 1.0);
        // Every later repeat starts at full scale
        assert_eq!(frames[100].left, 1.0);
        assert_eq!(frames[200].left, 1.0);
    }

    #[test]
    fn test_empty_slice_list_dropped() {
        let shared = shared_with_ring(64);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::StartLoop { slices: Vec::new() });
        assert!(!shared.loop_active.load(Ordering::Acquire));
        assert_eq!(shared.state.get(), EngineState::Idle);

        producer.apply(ProducerCommand::StartLoop {
            slices: vec![StereoClip::from_mono(&[0.1; 4]), StereoClip::new(Vec::new())],
        });
        assert!(!shared.loop_active.load(Ordering::Acquire));
    }

    #[test]
    fn test_stop_clears_everything() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::StartLoop {
            slices: vec![StereoClip::from_mono(&[0.5; 50])],
        });
        producer.pump();
        assert!(!shared.ring.is_empty());

        producer.apply(ProducerCommand::Stop);
        assert!(shared.ring.is_empty());
        assert!(!shared.loop_active.load(Ordering::Acquire));
        assert_eq!(shared.state.get(), EngineState::Idle);

        // Nothing trickles in afterwards
        producer.pump();
        assert!(shared.ring.is_empty());
    }

    #[test]
    fn test_set_tempo_ignored_while_playing() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 20]),
        });
        producer.pump();
        let before = shared.ring.occupied();

        producer.apply(ProducerCommand::SetTempo {
            target_bpm: 150.0,
            source_bpm: 120.0,
        });
        assert_eq!(shared.ring.occupied(), before);
    }

    #[test]
    fn test_set_tempo_clears_stale_audio_when_idle() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 20]),
        });
        producer.pump();
        shared.state.set(EngineState::Idle);

        producer.apply(ProducerCommand::SetTempo {
            target_bpm: 150.0,
            source_bpm: 120.0,
        });
        assert!(shared.ring.is_empty());
    }

    #[test]
    fn test_new_trigger_cancels_stale_ended_notification() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        shared.drain_pending.store(true, Ordering::Release);
        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 10]),
        });
        assert!(!shared.drain_pending.load(Ordering::Acquire));
    }

    #[test]
    fn test_dispatch_ended_fires_once_per_flag() {
        use std::sync::atomic::AtomicUsize;

        let shared = shared_with_ring(64);
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            *shared.ended_callback.lock().unwrap() = Some(Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }));
        }
        let producer = Producer::new(no_fade_config(), shared.clone());

        shared.drain_pending.store(true, Ordering::Release);
        producer.dispatch_ended();
        producer.dispatch_ended();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_playing_deferred_until_first_frames_land() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 100]),
        });
        assert_eq!(shared.state.get(), EngineState::Idle);

        // A drain flagged in the stage-to-write gap (e.g. by a callback
        // that ran against the previous clip) must not survive the trigger
        producer.shared.drain_pending.store(true, Ordering::Release);
        producer.pump();
        assert_eq!(shared.state.get(), EngineState::Playing);
        assert!(!shared.drain_pending.load(Ordering::Acquire));
    }

    #[test]
    fn test_retrigger_drops_to_idle_until_new_frames_land() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.25; 200]),
        });
        producer.pump();
        assert_eq!(shared.state.get(), EngineState::Playing);

        // Replacing the clip empties the ring; the state must leave
        // Playing with it so the callback cannot read the empty ring as
        // the old clip draining out
        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.75; 50]),
        });
        assert_eq!(shared.state.get(), EngineState::Idle);
        assert!(shared.ring.is_empty());

        producer.pump();
        assert_eq!(shared.state.get(), EngineState::Playing);
        assert_eq!(shared.ring.occupied(), 50);
    }

    #[test]
    fn test_set_tempo_ignored_while_trigger_staged() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 20]),
        });
        // Staged but not yet pumped: state still reads Idle, yet the
        // trigger must count as playing for the tempo guard
        assert_eq!(shared.state.get(), EngineState::Idle);

        producer.apply(ProducerCommand::SetTempo {
            target_bpm: 150.0,
            source_bpm: 120.0,
        });
        producer.pump();
        assert_eq!(shared.ring.occupied(), 20);
    }

    #[test]
    fn test_ended_callback_may_reregister_itself() {
        use std::sync::atomic::AtomicUsize;

        let shared = shared_with_ring(64);
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            let slot = Arc::clone(&shared.ended_callback);
            *shared.ended_callback.lock().unwrap() = Some(Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
                // Re-registering from inside the notification must not
                // deadlock on the registration lock
                *slot.lock().unwrap() = None;
            }));
        }
        let producer = Producer::new(no_fade_config(), shared.clone());

        shared.drain_pending.store(true, Ordering::Release);
        producer.dispatch_ended();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(shared.ended_callback.lock().unwrap().is_none());
    }

    #[test]
    fn test_pump_fills_only_to_high_watermark() {
        let shared = shared_with_ring(8192);
        let config = EngineConfig {
            fade_in_ms: 0,
            tail_fade_ms: 0,
            block_size: 64,
            // 10 ms at 44.1 kHz = 441 frames
            high_watermark_ms: 10,
            ..Default::default()
        };
        let mut producer = Producer::new(config, shared.clone());

        producer.apply(ProducerCommand::PlayOneShot {
            clip: StereoClip::from_mono(&[0.5; 1000]),
        });
        for _ in 0..5 {
            producer.pump();
        }
        // Fill stops at the watermark, not at ring capacity
        assert_eq!(shared.ring.occupied(), 441);
        assert_eq!(shared.state.get(), EngineState::Playing);

        // Consuming opens headroom and the remainder trickles in; every
        // frame of the clip still arrives
        let mut out = vec![StereoFrame::zero(); 200];
        let mut total = 0;
        for _ in 0..50 {
            total += shared.ring.read(&mut out);
            producer.pump();
            assert!(shared.ring.occupied() <= 441);
        }
        assert_eq!(total, 1000);
        assert!(producer.staged.is_none());
    }

    #[test]
    fn test_watermark_refill_keeps_loop_fed() {
        let shared = shared_with_ring(1024);
        let mut producer = Producer::new(no_fade_config(), shared.clone());

        producer.apply(ProducerCommand::StartLoop {
            slices: vec![StereoClip::from_mono(&[0.3; 100])],
        });
        for _ in 0..20 {
            producer.pump();
        }
        // Ring saturates near capacity while looping
        assert!(shared.ring.occupied() > 900);

        // Drain most of it; the producer refills on the next pumps
        let mut out = vec![StereoFrame::zero(); 900];
        shared.ring.read(&mut out);
        for _ in 0..20 {
            producer.pump();
        }
        assert!(shared.ring.occupied() > 900);
    }
}
