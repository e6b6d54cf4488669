//! drumfield - terminal drum machine with a particle field
//!
//! Run with: cargo run -- --help

mod app;
mod config;
mod ui;

use std::{fs::File, path::Path, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use config::Args;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_file)?;

    app::run(args)
}

/// Log to a file; stdout is owned by the terminal UI
fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path).wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drumfield=info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
