//! drumfield - wiring between the audio device, the engine and the UI
//!
//! The engine is moved into the audio callback and never leaves it. The UI
//! talks to it only through ring buffers:
//!
//! ```text
//!   UI ──Command──────────▶ audio callback ──StateUpdate──▶ UI
//!   loader ──InstallSample─▶               ──f32 tap──────▶ UI (meters)
//!                                          ──old Sample───▶ UI (freed there)
//! ```

use std::{io::stdout, path::PathBuf, thread};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use rand::{rngs::SmallRng, SeedableRng};
use rtrb::{Producer, RingBuffer};

use drumfield::{
    engine::{Command, Engine},
    kit::{DrumKit, Sample},
    particles::ParticleField,
    sequencing::{PresetLibrary, Voice},
    MAX_BLOCK_SIZE,
};

use super::config::Args;
use super::ui::{UiApp, UiChannels, UiInit};

const COMMAND_QUEUE_SIZE: usize = 256;
const STATE_QUEUE_SIZE: usize = 64;

pub fn run(args: Args) -> EyreResult<()> {
    let library = match &args.presets {
        Some(path) => PresetLibrary::from_path(path)?,
        None => PresetLibrary::builtin(),
    };
    let preset = match &args.preset {
        Some(name) => library.find(name)?,
        None => 0,
    };

    // Set up audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;
    tracing::info!(sample_rate, channels, device = ?device.name().ok(), "audio device ready");

    let mut engine = Engine::builder(sample_rate as f64)
        .bpm(args.bpm)
        .library(library.clone())
        .preset(Some(preset))
        .build()?;
    let initial_state = engine.state();

    let (command_tx, mut command_rx) = RingBuffer::<Command>::new(COMMAND_QUEUE_SIZE);
    let (kit_tx, mut kit_rx) = RingBuffer::<Command>::new(Voice::COUNT);
    let (mut state_tx, state_rx) = RingBuffer::new(STATE_QUEUE_SIZE);
    // About a second of audio for the level meters
    let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(sample_rate as usize);
    let (mut retired_tx, retired_rx) = RingBuffer::<Sample>::new(Voice::COUNT);

    spawn_kit_loader(args.samples.clone(), sample_rate, kit_tx)?;

    let mut block = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            // Rejections are totalled in the state update and logged by the UI
            engine.drain(&mut kit_rx);
            engine.drain(&mut command_rx);
            while retired_tx.slots() > 0 {
                let Some(sample) = engine.pop_retired() else {
                    break;
                };
                let _ = retired_tx.push(sample);
            }

            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let buf = &mut block[..frames_to_render];
                engine.process_block(buf);

                // Copy to output (mono to all channels)
                let out_off = frames_written * channels;
                for (i, &s) in buf.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                    let _ = audio_tx.push(s);
                }

                frames_written += frames_to_render;
            }

            let _ = state_tx.push(engine.state());
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;

    stream.play()?;

    let (field_rng, ui_rng) = split_rngs(args.seed)?;
    // Sized on the first frame, once the terminal layout is known
    let field = ParticleField::new(0.0, 0.0, args.particles.map(usize::from), field_rng);

    let init = UiInit {
        sample_rate,
        library,
        teleport: !args.no_teleport,
    };
    let channels = UiChannels {
        commands: command_tx,
        state_rx,
        audio_rx,
        retired_rx,
    };
    let mut ui = UiApp::new(channels, initial_state, init, field, ui_rng);

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;
    let result = ui.run(&mut terminal);
    let _ = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();

    tracing::info!("shutting down");
    drop(stream);
    result
}

/// Load or synthesize the kit off the audio thread
///
/// Each voice becomes playable as soon as the callback picks up its sample;
/// until then it is silent.
fn spawn_kit_loader(
    dir: Option<PathBuf>,
    sample_rate: u32,
    mut kit_tx: Producer<Command>,
) -> EyreResult<()> {
    thread::Builder::new()
        .name("kit-loader".into())
        .spawn(move || {
            let kit = match dir {
                Some(dir) => DrumKit::load_dir(dir, sample_rate),
                None => DrumKit::synthesized(sample_rate),
            };
            for (voice, sample) in kit.into_samples() {
                if kit_tx.push(Command::InstallSample { voice, sample }).is_err() {
                    tracing::warn!(%voice, "kit queue full, voice stays silent");
                }
            }
            tracing::info!("kit loaded");
        })
        .wrap_err("failed to spawn kit loader")?;
    Ok(())
}

/// Independent random streams for the particle field and the UI's preset picks
///
/// Both follow from `seed` when one is given.
fn split_rngs(seed: Option<u64>) -> Result<(SmallRng, SmallRng), rand::Error> {
    let mut field_rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let ui_rng = SmallRng::from_rng(&mut field_rng)?;
    Ok((field_rng, ui_rng))
}
