//! Command line interface for Freebody

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use freebody::config::PanelsConfig;
use freebody::physics::snapshot::WorldSnapshot;
use freebody::plugins::playback::{SnapshotFileError, load_json_lines};
use freebody::render::projector::{MAX_ZOOM, MIN_ZOOM};

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    ConfigLoad(String),
    /// Snapshot file could not be replayed
    SnapshotLoad(SnapshotFileError),
    /// A flag value outside its allowed range
    InvalidValue(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::SnapshotLoad(e) => write!(f, "Failed to load snapshots: {e}"),
            CliError::InvalidValue(msg) => write!(f, "Invalid value: {msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::SnapshotLoad(e) => Some(e),
            _ => None,
        }
    }
}

/// Freebody - physics snapshot visualizer with free body diagrams
#[derive(Parser, Debug)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about,
    long_about = None
)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replay snapshots from a JSON-lines file instead of the built-in demo
    #[arg(short, long, value_name = "FILE")]
    pub snapshots: Option<PathBuf>,

    /// Start paused
    #[arg(short = 'p', long)]
    pub paused: bool,

    /// Hide the scene grid
    #[arg(long)]
    pub no_grid: bool,

    /// Hide velocity vectors
    #[arg(long)]
    pub no_vectors: bool,

    /// Stop at the last snapshot instead of starting over
    #[arg(long)]
    pub no_loop: bool,

    /// Initial scene zoom (0.5 to 3.0)
    #[arg(short, long, value_name = "FACTOR")]
    pub zoom: Option<f32>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Loads configuration from file or defaults, then applies command-line overrides
pub fn load_and_apply_config(args: &Args) -> Result<PanelsConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        PanelsConfig::load(config_path).map_err(|e| CliError::ConfigLoad(e.to_string()))?
    } else {
        PanelsConfig::load_from_user_config()
    };

    if let Some(snapshots) = &args.snapshots {
        config.playback.snapshot_file = Some(snapshots.clone());
    }

    if args.paused {
        config.playback.start_paused = true;
    }

    if args.no_loop {
        config.playback.looping = false;
    }

    if args.no_grid {
        config.display.show_grid = false;
    }

    if args.no_vectors {
        config.display.show_vectors = false;
    }

    if let Some(zoom) = args.zoom {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(CliError::InvalidValue(format!(
                "zoom {zoom} is outside {MIN_ZOOM}..={MAX_ZOOM}"
            )));
        }
        println!("Using initial zoom: {zoom}");
        config.display.zoom = zoom;
    }

    Ok(config)
}

/// Reads the configured snapshot file, if any. `None` means play the demo.
pub fn load_snapshots(config: &PanelsConfig) -> Result<Option<Vec<WorldSnapshot>>, CliError> {
    config
        .playback
        .snapshot_file
        .as_deref()
        .map(|path| load_json_lines(path).map_err(CliError::SnapshotLoad))
        .transpose()
}
