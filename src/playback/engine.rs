//! Playback engine
//!
//! Owns the producer thread, the output-owner thread, and the shared state
//! between them. The caller owns the `Engine`; there is no process-wide
//! instance.
//!
//! ## Threads
//!
//! ```text
//! Control (caller) ──commands──▶ Producer thread ──write──▶ StereoRingBuffer
//!                                                                  │
//!                                                                read
//!                                                                  ▼
//!                    Output-owner thread ──owns──▶ cpal stream ── callback
//! ```
//!
//! The cpal `Stream` is not `Send`, so a dedicated thread builds and holds
//! it. That thread also polls the current-rate atomic and rebuilds the
//! stream when a tempo change publishes a new rate. Stream-open failures at
//! startup are reported back to `start()` over a one-shot channel.

use crate::audio::output::AudioOutput;
use crate::audio::types::{StereoClip, StereoFrame};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::playback::command::{command_channel, CommandSender, ProducerCommand};
use crate::playback::producer::{run_producer, EndedCallback, ProducerShared};
use crate::playback::ring_buffer::{RingBufferStats, StereoRingBuffer};
use crate::playback::state::{EngineState, SharedEngineState};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long `start()` waits for the output thread to open its stream
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll cadence of the output-owner thread (stop flag + rate changes)
const OUTPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Per-run resources, torn down together on `stop()`.
struct Running {
    command_tx: CommandSender,
    ring: Arc<StereoRingBuffer>,
    stop_flag: Arc<AtomicBool>,
    producer: JoinHandle<()>,
    output: JoinHandle<()>,
}

/// Real-time clip playback engine.
///
/// Triggers are non-blocking: they validate, enqueue a command for the
/// producer thread, and return. Audio flows producer → ring buffer →
/// callback; the callback never allocates, blocks, or runs user code.
pub struct Engine {
    config: EngineConfig,
    state: Arc<SharedEngineState>,

    /// Current output rate; tempo changes replace it, `config.sample_rate`
    /// stays the base
    current_sample_rate: Arc<AtomicU32>,

    underruns: Arc<AtomicU64>,
    loop_active: Arc<AtomicBool>,
    drain_pending: Arc<AtomicBool>,
    ended_callback: Arc<Mutex<Option<EndedCallback>>>,
    gain: Arc<Mutex<f32>>,
    running: Option<Running>,
}

impl Engine {
    /// Create a new engine in the `Stopped` state. No threads run and no
    /// device is touched until [`start`](Engine::start).
    pub fn new(config: EngineConfig) -> Self {
        let base_rate = config.sample_rate;
        Self {
            config,
            state: Arc::new(SharedEngineState::new(EngineState::Stopped)),
            current_sample_rate: Arc::new(AtomicU32::new(base_rate)),
            underruns: Arc::new(AtomicU64::new(0)),
            loop_active: Arc::new(AtomicBool::new(false)),
            drain_pending: Arc::new(AtomicBool::new(false)),
            ended_callback: Arc::new(Mutex::new(None)),
            gain: Arc::new(Mutex::new(1.0)),
            running: None,
        }
    }

    /// Open the output stream and spawn the producer and output-owner
    /// threads. No-op when already running.
    ///
    /// A stream-open failure is returned from here and leaves the engine
    /// `Stopped` with no threads running.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            debug!("Engine already running");
            return Ok(());
        }

        let rate = self.current_sample_rate.load(Ordering::Acquire);
        let ring = Arc::new(StereoRingBuffer::new(self.config.ring_capacity_frames(rate)));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let shared = ProducerShared {
            ring: Arc::clone(&ring),
            state: Arc::clone(&self.state),
            loop_active: Arc::clone(&self.loop_active),
            drain_pending: Arc::clone(&self.drain_pending),
            ended_callback: Arc::clone(&self.ended_callback),
            current_sample_rate: Arc::clone(&self.current_sample_rate),
            underruns: Arc::clone(&self.underruns),
            stop_flag: Arc::clone(&stop_flag),
        };

        let (command_tx, command_rx) = command_channel();

        let producer = thread::Builder::new().name("clipdeck-producer".into()).spawn({
            let config = self.config.clone();
            let shared = shared.clone();
            move || run_producer(command_rx, config, shared)
        })?;

        let (startup_tx, startup_rx) = mpsc::channel();
        let output = {
            let device = self.config.device.clone();
            let block_size = self.config.block_size;
            let gain = Arc::clone(&self.gain);
            let autostop = self.config.autostop_one_shot;
            let shared = shared.clone();
            let spawned = thread::Builder::new().name("clipdeck-output".into()).spawn(
                move || run_output(device, block_size, gain, autostop, shared, startup_tx),
            );
            match spawned {
                Ok(handle) => handle,
                Err(e) => {
                    stop_flag.store(true, Ordering::Release);
                    drop(command_tx);
                    let _ = producer.join();
                    return Err(e.into());
                }
            }
        };

        let startup = match startup_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(result) => result,
            Err(_) => Err(Error::AudioOutput(
                "Timed out waiting for output stream to open".to_string(),
            )),
        };
        if let Err(e) = startup {
            stop_flag.store(true, Ordering::Release);
            drop(command_tx);
            let _ = producer.join();
            let _ = output.join();
            return Err(e);
        }

        self.state.set(EngineState::Idle);
        self.running = Some(Running {
            command_tx,
            ring,
            stop_flag,
            producer,
            output,
        });
        info!("Engine started: rate={} Hz, block={} frames", rate, self.config.block_size);
        Ok(())
    }

    /// Stop the engine: signal both threads, join them, close the stream,
    /// and discard buffered audio. Idempotent.
    pub fn stop(&mut self) -> Result<()> {
        let Some(running) = self.running.take() else {
            return Ok(());
        };
        info!("Stopping engine");

        let Running {
            command_tx,
            ring,
            stop_flag,
            producer,
            output,
        } = running;

        stop_flag.store(true, Ordering::Release);
        // Disconnect the channel as a second wake-up path for the producer
        drop(command_tx);

        let mut join_error = None;
        if producer.join().is_err() {
            join_error = Some("producer thread panicked");
        }
        if output.join().is_err() {
            join_error = Some("output thread panicked");
        }

        ring.clear();
        self.loop_active.store(false, Ordering::Release);
        self.drain_pending.store(false, Ordering::Release);
        self.state.set(EngineState::Stopped);

        match join_error {
            Some(msg) => Err(Error::Engine(msg.to_string())),
            None => Ok(()),
        }
    }

    fn sender(&self) -> Result<&CommandSender> {
        self.running
            .as_ref()
            .map(|r| &r.command_tx)
            .ok_or_else(|| Error::Engine("engine is not running".to_string()))
    }

    fn send(&self, command: ProducerCommand) -> Result<()> {
        self.sender()?
            .send(command)
            .map_err(|_| Error::Engine("command channel closed".to_string()))
    }

    /// Hard-cut to a single clip. Anything currently playing is replaced
    /// immediately; the clip gets a fade-in and tail fade per the config.
    pub fn play_one_shot(&self, clip: impl Into<StereoClip>) -> Result<()> {
        let clip = clip.into();
        if clip.is_empty() {
            return Err(Error::InvalidTrigger("one-shot clip is empty".to_string()));
        }
        self.send(ProducerCommand::PlayOneShot { clip })
    }

    /// Hard-cut to a gapless loop over `slices`, cycling first-to-last
    /// until stopped or replaced. Only the very first slice gets a fade-in.
    pub fn start_loop(&self, slices: Vec<StereoClip>) -> Result<()> {
        if slices.is_empty() {
            return Err(Error::InvalidTrigger("loop slice list is empty".to_string()));
        }
        if let Some(idx) = slices.iter().position(|s| s.is_empty()) {
            return Err(Error::InvalidTrigger(format!("loop slice {} is empty", idx)));
        }
        self.send(ProducerCommand::StartLoop { slices })
    }

    /// Stop playback immediately. The stream keeps running silent and the
    /// engine returns to `Idle`.
    pub fn stop_playback(&self) -> Result<()> {
        self.send(ProducerCommand::Stop)
    }

    /// Change playback tempo by scaling the output sample rate:
    /// `new_rate = round(base_rate * target_bpm / source_bpm)`.
    ///
    /// Returns false (and changes nothing) when either BPM is non-positive
    /// or audio is currently playing. The ratio is always applied to the
    /// configured base rate, so successive changes do not compound.
    pub fn set_tempo(&self, target_bpm: f32, source_bpm: f32) -> bool {
        if target_bpm <= 0.0 || source_bpm <= 0.0 {
            debug!(
                "Rejecting tempo change with non-positive BPM ({} / {})",
                target_bpm, source_bpm
            );
            return false;
        }
        if self.state.get() == EngineState::Playing {
            debug!("Rejecting tempo change while playing");
            return false;
        }

        let ratio = target_bpm / source_bpm;
        let new_rate = (self.config.sample_rate as f32 * ratio).round() as u32;
        if new_rate == 0 {
            return false;
        }

        self.current_sample_rate.store(new_rate, Ordering::Release);
        if let Some(running) = self.running.as_ref() {
            // Producer clears stale buffered audio; the output thread
            // notices the new rate and reopens the stream
            let _ = running.command_tx.send(ProducerCommand::SetTempo {
                target_bpm,
                source_bpm,
            });
        }
        info!(
            "Tempo set: {:.1} BPM against {:.1} BPM source, output rate {} Hz",
            target_bpm, source_bpm, new_rate
        );
        true
    }

    /// Register a callback fired after an autostop one-shot finishes
    /// draining. Invoked from the producer thread, never from the audio
    /// callback; keep it short.
    pub fn set_playback_ended_callback(&self, callback: impl Fn() + Send + Sync + 'static) {
        *self.ended_callback.lock().unwrap() = Some(Arc::new(callback));
    }

    /// Set master output gain, clamped to [0.0, 1.0].
    pub fn set_gain(&self, gain: f32) {
        *self.gain.lock().unwrap() = gain.clamp(0.0, 1.0);
    }

    /// Current master output gain.
    pub fn gain(&self) -> f32 {
        *self.gain.lock().unwrap()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    /// Current output sample rate (reflects tempo changes).
    pub fn sample_rate(&self) -> u32 {
        self.current_sample_rate.load(Ordering::Acquire)
    }

    /// Lifetime underrun/drain count.
    pub fn underrun_count(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// True between a successful `start()` and the matching `stop()`.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Ring buffer occupancy snapshot, when running.
    pub fn ring_stats(&self) -> Option<RingBufferStats> {
        self.running.as_ref().map(|r| r.ring.stats())
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Build the real-time block callback.
///
/// The callback reads from the ring buffer, silence-fills short reads, and
/// detects end-of-audio: when state was `Playing`, the ring has drained,
/// and no loop is active, it bumps the underrun counter and transitions
/// state. The compare-exchange transition means a concurrent trigger
/// (which publishes `Playing` only after its first frames reach the ring)
/// always wins over a drain racing with it.
fn make_block_callback(
    shared: &ProducerShared,
    autostop: bool,
) -> impl FnMut(&mut [StereoFrame]) + Send + 'static {
    let ring = Arc::clone(&shared.ring);
    let state = Arc::clone(&shared.state);
    let loop_active = Arc::clone(&shared.loop_active);
    let drain_pending = Arc::clone(&shared.drain_pending);
    let underruns = Arc::clone(&shared.underruns);

    move |block: &mut [StereoFrame]| {
        let read = ring.read(block);
        for frame in &mut block[read..] {
            *frame = StereoFrame::zero();
        }

        if state.get() == EngineState::Playing
            && ring.is_empty()
            && !loop_active.load(Ordering::Acquire)
        {
            underruns.fetch_add(1, Ordering::Relaxed);
            if autostop {
                if state.compare_exchange(EngineState::Playing, EngineState::Idle) {
                    drain_pending.store(true, Ordering::Release);
                }
            } else {
                state.compare_exchange(EngineState::Playing, EngineState::Armed);
            }
        }
    }
}

/// Output-owner thread body.
///
/// cpal streams are not `Send`, so this thread builds the `AudioOutput`,
/// reports the result back to `start()`, then holds the stream alive while
/// polling the stop flag and the published sample rate. A rate change
/// tears the stream down and reopens it at the new rate.
fn run_output(
    device: Option<String>,
    block_size: u32,
    gain: Arc<Mutex<f32>>,
    autostop: bool,
    shared: ProducerShared,
    startup_tx: mpsc::Sender<Result<()>>,
) {
    let mut current_rate = shared.current_sample_rate.load(Ordering::Acquire);

    let mut output = match open_stream(
        device.clone(),
        current_rate,
        block_size,
        Arc::clone(&gain),
        &shared,
        autostop,
    ) {
        Ok(output) => {
            let _ = startup_tx.send(Ok(()));
            output
        }
        Err(e) => {
            let _ = startup_tx.send(Err(e));
            return;
        }
    };
    debug!(
        "Audio output thread running: device='{}', rate={} Hz",
        output.device_name(),
        output.sample_rate()
    );

    loop {
        thread::sleep(OUTPUT_POLL_INTERVAL);
        if shared.stop_flag.load(Ordering::Acquire) {
            break;
        }

        let wanted = shared.current_sample_rate.load(Ordering::Acquire);
        if wanted != current_rate {
            info!(
                "Output rate change {} -> {} Hz, reopening stream",
                current_rate, wanted
            );
            if let Err(e) = output.stop() {
                warn!("Failed to stop stream for rate change: {}", e);
            }
            match open_stream(
                device.clone(),
                wanted,
                block_size,
                Arc::clone(&gain),
                &shared,
                autostop,
            ) {
                Ok(new_output) => {
                    output = new_output;
                    current_rate = wanted;
                }
                Err(e) => {
                    // Retried on the next poll; the device may come back
                    error!("Failed to reopen stream at {} Hz: {}", wanted, e);
                }
            }
        }

        if output.has_error() {
            warn!("Audio stream reported an error");
            output.clear_error();
        }
    }

    if let Err(e) = output.stop() {
        warn!("Failed to stop audio stream: {}", e);
    }
    debug!("Audio output thread stopped");
}

fn open_stream(
    device: Option<String>,
    sample_rate: u32,
    block_size: u32,
    gain: Arc<Mutex<f32>>,
    shared: &ProducerShared,
    autostop: bool,
) -> Result<AudioOutput> {
    let mut output = AudioOutput::new(device, sample_rate, block_size, gain)?;
    output.start(make_block_callback(shared, autostop))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default())
    }

    #[test]
    fn test_new_engine_is_stopped() {
        let engine = engine();
        assert_eq!(engine.state(), EngineState::Stopped);
        assert!(!engine.is_running());
        assert_eq!(engine.sample_rate(), 44_100);
        assert_eq!(engine.underrun_count(), 0);
        assert!(engine.ring_stats().is_none());
    }

    #[test]
    fn test_triggers_require_running_engine() {
        let engine = engine();
        assert!(matches!(
            engine.play_one_shot(StereoClip::from_mono(&[0.5; 4])),
            Err(Error::Engine(_))
        ));
        assert!(matches!(
            engine.start_loop(vec![StereoClip::from_mono(&[0.5; 4])]),
            Err(Error::Engine(_))
        ));
        assert!(matches!(engine.stop_playback(), Err(Error::Engine(_))));
    }

    #[test]
    fn test_empty_clip_rejected_before_enqueue() {
        let engine = engine();
        assert!(matches!(
            engine.play_one_shot(StereoClip::new(Vec::new())),
            Err(Error::InvalidTrigger(_))
        ));
    }

    #[test]
    fn test_empty_slice_list_rejected() {
        let engine = engine();
        assert!(matches!(
            engine.start_loop(Vec::new()),
            Err(Error::InvalidTrigger(_))
        ));
        assert!(matches!(
            engine.start_loop(vec![
                StereoClip::from_mono(&[0.5; 4]),
                StereoClip::new(Vec::new()),
            ]),
            Err(Error::InvalidTrigger(_))
        ));
    }

    #[test]
    fn test_mono_vec_converts_via_into() {
        let engine = engine();
        // Conversion happens before the running check rejects it
        let result = engine.play_one_shot(vec![0.5f32; 8]);
        assert!(matches!(result, Err(Error::Engine(_))));
    }

    #[test]
    fn test_set_tempo_rejects_non_positive_bpm() {
        let engine = engine();
        assert!(!engine.set_tempo(0.0, 120.0));
        assert!(!engine.set_tempo(140.0, -1.0));
        assert_eq!(engine.sample_rate(), 44_100);
    }

    #[test]
    fn test_set_tempo_rejected_while_playing() {
        let engine = engine();
        engine.state.set(EngineState::Playing);
        assert!(!engine.set_tempo(150.0, 120.0));
        assert_eq!(engine.sample_rate(), 44_100);
    }

    #[test]
    fn test_set_tempo_scales_from_base_rate() {
        let engine = engine();
        assert!(engine.set_tempo(150.0, 120.0));
        assert_eq!(engine.sample_rate(), 55_125);

        // Second change applies against the base, not the current rate
        assert!(engine.set_tempo(120.0, 120.0));
        assert_eq!(engine.sample_rate(), 44_100);
    }

    #[test]
    fn test_stop_when_not_running_is_idempotent() {
        let mut engine = engine();
        assert!(engine.stop().is_ok());
        assert!(engine.stop().is_ok());
        assert_eq!(engine.state(), EngineState::Stopped);
    }

    #[test]
    fn test_gain_clamped() {
        let engine = engine();
        engine.set_gain(1.5);
        assert_eq!(engine.gain(), 1.0);
        engine.set_gain(-0.2);
        assert_eq!(engine.gain(), 0.0);
        engine.set_gain(0.6);
        assert_eq!(engine.gain(), 0.6);
    }

    #[test]
    fn test_block_callback_silence_fills_and_transitions() {
        let shared = ProducerShared {
            ring: Arc::new(StereoRingBuffer::new(64)),
            state: Arc::new(SharedEngineState::new(EngineState::Playing)),
            loop_active: Arc::new(AtomicBool::new(false)),
            drain_pending: Arc::new(AtomicBool::new(false)),
            ended_callback: Arc::new(Mutex::new(None)),
            current_sample_rate: Arc::new(AtomicU32::new(44_100)),
            underruns: Arc::new(AtomicU64::new(0)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        };
        shared.ring.write(&[StereoFrame::from_mono(0.5); 10]);

        let mut callback = make_block_callback(&shared, true);
        let mut block = [StereoFrame::from_mono(9.9); 16];
        callback(&mut block);

        // First 10 frames are audio, remainder silence-filled
        assert!(block[..10].iter().all(|f| f.left == 0.5));
        assert!(block[10..].iter().all(|f| f.left == 0.0));

        // Drained with no loop: autostop goes Idle and flags the
        // ended notification exactly once
        assert_eq!(shared.state.get(), EngineState::Idle);
        assert!(shared.drain_pending.load(Ordering::Acquire));
        assert_eq!(shared.underruns.load(Ordering::Relaxed), 1);

        // Subsequent empty reads stay Idle without recounting
        callback(&mut block);
        assert_eq!(shared.underruns.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_block_callback_arms_without_autostop() {
        let shared = ProducerShared {
            ring: Arc::new(StereoRingBuffer::new(64)),
            state: Arc::new(SharedEngineState::new(EngineState::Playing)),
            loop_active: Arc::new(AtomicBool::new(false)),
            drain_pending: Arc::new(AtomicBool::new(false)),
            ended_callback: Arc::new(Mutex::new(None)),
            current_sample_rate: Arc::new(AtomicU32::new(44_100)),
            underruns: Arc::new(AtomicU64::new(0)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        };

        let mut callback = make_block_callback(&shared, false);
        let mut block = [StereoFrame::zero(); 8];
        callback(&mut block);

        assert_eq!(shared.state.get(), EngineState::Armed);
        assert!(!shared.drain_pending.load(Ordering::Acquire));
    }

    #[test]
    fn test_retrigger_never_fires_spurious_ended_notification() {
        use std::sync::atomic::AtomicUsize;
        use std::time::Instant;

        let shared = ProducerShared {
            ring: Arc::new(StereoRingBuffer::new(4096)),
            state: Arc::new(SharedEngineState::new(EngineState::Idle)),
            loop_active: Arc::new(AtomicBool::new(false)),
            drain_pending: Arc::new(AtomicBool::new(false)),
            ended_callback: Arc::new(Mutex::new(None)),
            current_sample_rate: Arc::new(AtomicU32::new(44_100)),
            underruns: Arc::new(AtomicU64::new(0)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        };
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = Arc::clone(&fired);
            *shared.ended_callback.lock().unwrap() = Some(Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }));
        }

        let config = EngineConfig {
            fade_in_ms: 0,
            tail_fade_ms: 0,
            ..Default::default()
        };
        let (command_tx, command_rx) = command_channel();
        let producer = thread::spawn({
            let config = config.clone();
            let shared = shared.clone();
            move || run_producer(command_rx, config, shared)
        });

        // A clip far larger than the ring, so it can never drain before
        // the next round replaces it. Each round runs the callback through
        // the window between the trigger landing and its first frames
        // reaching the ring; the callback must never mistake that window
        // for the clip ending.
        let clip = vec![0.5f32; 88_200];
        let mut callback = make_block_callback(&shared, true);
        let mut block = [StereoFrame::zero(); 16];
        for round in 0..5 {
            if round > 0 {
                command_tx.send(ProducerCommand::Stop).unwrap();
                let deadline = Instant::now() + Duration::from_secs(5);
                while shared.state.get() == EngineState::Playing {
                    assert!(Instant::now() < deadline, "stop was never applied");
                    thread::sleep(Duration::from_millis(1));
                }
            }
            command_tx
                .send(ProducerCommand::PlayOneShot {
                    clip: StereoClip::from_mono(&clip),
                })
                .unwrap();
            let deadline = Instant::now() + Duration::from_secs(5);
            loop {
                callback(&mut block);
                if shared.state.get() == EngineState::Playing {
                    break;
                }
                assert!(Instant::now() < deadline, "trigger never started playing");
            }
        }

        shared.stop_flag.store(true, Ordering::Release);
        drop(command_tx);
        producer.join().unwrap();

        assert_eq!(
            fired.load(Ordering::SeqCst),
            0,
            "ended notification fired for a clip that never drained"
        );
        assert_eq!(shared.underruns.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_block_callback_keeps_playing_while_loop_active() {
        let shared = ProducerShared {
            ring: Arc::new(StereoRingBuffer::new(64)),
            state: Arc::new(SharedEngineState::new(EngineState::Playing)),
            loop_active: Arc::new(AtomicBool::new(true)),
            drain_pending: Arc::new(AtomicBool::new(false)),
            ended_callback: Arc::new(Mutex::new(None)),
            current_sample_rate: Arc::new(AtomicU32::new(44_100)),
            underruns: Arc::new(AtomicU64::new(0)),
            stop_flag: Arc::new(AtomicBool::new(false)),
        };

        let mut callback = make_block_callback(&shared, true);
        let mut block = [StereoFrame::zero(); 8];
        callback(&mut block);

        // An empty ring mid-loop is a producer stall, not end-of-audio
        assert_eq!(shared.state.get(), EngineState::Playing);
        assert!(!shared.drain_pending.load(Ordering::Acquire));
    }
}
