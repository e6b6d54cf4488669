//! Command-line configuration

use std::path::PathBuf;

use clap::Parser;
use drumfield::transport::{DEFAULT_BPM, MAX_BPM, MIN_BPM};

#[derive(Parser, Debug)]
#[command(name = "drumfield", version)]
#[command(about = "Terminal drum machine with a particle field")]
pub struct Args {
    /// Initial tempo in BPM (20-300)
    #[arg(long, default_value_t = DEFAULT_BPM, value_parser = parse_bpm)]
    pub bpm: f64,

    /// Preset loaded at startup (defaults to the first one)
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// JSON file with a preset library, replacing the built-in grooves
    #[arg(long, value_name = "FILE")]
    pub presets: Option<PathBuf>,

    /// Directory holding kick.wav, snare.wav, open_hat.wav and closed_hat.wav
    #[arg(long, value_name = "DIR")]
    pub samples: Option<PathBuf>,

    /// Number of particles (1-100, random when omitted)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=100))]
    pub particles: Option<u16>,

    /// Seed for the particle field and random preset picks
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep the particle field still when a new bar starts
    #[arg(long)]
    pub no_teleport: bool,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long, value_name = "PATH", default_value = "drumfield.log")]
    pub log_file: PathBuf,
}

fn parse_bpm(value: &str) -> Result<f64, String> {
    let bpm: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
    if (MIN_BPM..=MAX_BPM).contains(&bpm) {
        Ok(bpm)
    } else {
        Err(format!("tempo must be between {MIN_BPM} and {MAX_BPM} BPM"))
    }
}
