//! clipdeck - Clip audition CLI
//!
//! Loads a WAV file and plays it through the engine, either as a one-shot
//! or as a gapless loop sliced into equal parts. Mostly useful for
//! listening tests against real hardware.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossbeam_channel::bounded;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clipdeck::{AudioOutput, Engine, EngineConfig, StereoClip};

/// Command-line arguments for clipdeck
#[derive(Parser, Debug)]
#[command(name = "clipdeck")]
#[command(about = "Audition audio clips through the clipdeck engine")]
#[command(version)]
struct Args {
    /// WAV file to play (required unless --list-devices)
    file: Option<PathBuf>,

    /// Output device name (default: system default)
    #[arg(short, long, env = "CLIPDECK_DEVICE")]
    device: Option<String>,

    /// Loop the clip, sliced into this many equal parts
    #[arg(short = 'l', long, value_name = "SLICES")]
    loop_slices: Option<usize>,

    /// How long to hold a loop before stopping, in seconds
    #[arg(long, default_value = "10", value_name = "SECONDS")]
    loop_seconds: u64,

    /// Playback tempo in BPM (requires --source-bpm)
    #[arg(short, long)]
    tempo: Option<f32>,

    /// Tempo the source material was rendered at
    #[arg(long, default_value = "120")]
    source_bpm: f32,

    /// Master output gain (0.0 to 1.0)
    #[arg(short, long, default_value = "1.0")]
    gain: f32,

    /// List available output devices and exit
    #[arg(long)]
    list_devices: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clipdeck=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if args.list_devices {
        for name in AudioOutput::list_devices().context("Failed to enumerate devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let Some(file) = args.file.as_ref() else {
        bail!("No input file given (or use --list-devices)");
    };

    let config = EngineConfig {
        device: args.device.clone(),
        ..Default::default()
    };
    let clip = load_wav(file, config.sample_rate)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    info!(
        "Loaded {}: {} frames ({} ms)",
        file.display(),
        clip.len(),
        clip.duration_ms(config.sample_rate)
    );

    let clip_ms = clip.duration_ms(config.sample_rate);
    let mut engine = Engine::new(config);

    if let Some(tempo) = args.tempo {
        if !engine.set_tempo(tempo, args.source_bpm) {
            bail!("Tempo change rejected ({} / {} BPM)", tempo, args.source_bpm);
        }
    }

    engine.start().context("Failed to start engine")?;
    engine.set_gain(args.gain);
    info!("Engine running at {} Hz", engine.sample_rate());

    match args.loop_slices {
        Some(slices) => {
            engine
                .start_loop(slice_clip(clip, slices)?)
                .context("Failed to start loop")?;
            info!(
                "Looping {} slices for {} seconds",
                slices, args.loop_seconds
            );
            std::thread::sleep(Duration::from_secs(args.loop_seconds));
            engine.stop_playback().context("Failed to stop playback")?;
        }
        None => {
            let (done_tx, done_rx) = bounded(1);
            engine.set_playback_ended_callback(move || {
                let _ = done_tx.send(());
            });
            engine.play_one_shot(clip).context("Failed to trigger clip")?;

            // Tempo scaling stretches wall-clock duration; pad generously
            let timeout = Duration::from_millis(clip_ms * 2 + 3000);
            match done_rx.recv_timeout(timeout) {
                Ok(()) => info!("Playback finished"),
                Err(_) => info!("Timed out waiting for playback to end"),
            }
        }
    }

    if engine.underrun_count() > 1 {
        info!("Underruns observed: {}", engine.underrun_count());
    }
    engine.stop().context("Failed to stop engine")?;
    Ok(())
}

/// Load a WAV file as a StereoClip, accepting mono or stereo, integer or
/// float samples. Other channel counts are rejected.
fn load_wav(path: &Path, expected_rate: u32) -> Result<StereoClip> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_rate != expected_rate {
        info!(
            "{}: file rate {} Hz differs from engine rate {} Hz (played as-is)",
            path.display(),
            spec.sample_rate,
            expected_rate
        );
    }

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    match spec.channels {
        1 => Ok(StereoClip::from_mono(&samples)),
        2 => Ok(StereoClip::from_interleaved(&samples)),
        n => bail!("Unsupported channel count: {}", n),
    }
}

/// Split a clip into `count` contiguous slices of (near-)equal length.
fn slice_clip(clip: StereoClip, count: usize) -> Result<Vec<StereoClip>> {
    if count == 0 {
        bail!("Slice count must be at least 1");
    }
    if clip.len() < count {
        bail!("Clip too short to cut into {} slices", count);
    }

    let chunk = clip.len() / count;
    let mut slices: Vec<StereoClip> = clip
        .frames
        .chunks(chunk)
        .map(|frames| StereoClip::new(frames.to_vec()))
        .collect();
    // chunks() can leave a short remainder slice; fold it into the last
    if slices.len() > count {
        if let Some(tail) = slices.pop() {
            slices[count - 1].frames.extend(tail.frames);
        }
    }
    Ok(slices)
}
