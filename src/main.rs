mod cli;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use clap::Parser;
use cli::Args;
use freebody::plugins::{BackendPlugin, ControlsPlugin, PanelsPlugin, PlaybackPlugin};

fn main() {
    let args = Args::parse();

    let config = match cli::load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if args.print_config {
        match toml::to_string_pretty(&config) {
            Ok(toml_string) => print!("{toml_string}"),
            Err(e) => {
                eprintln!("Failed to serialize configuration: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let playback = match cli::load_snapshots(&config) {
        Ok(Some(frames)) => PlaybackPlugin::with_frames(frames),
        Ok(None) => PlaybackPlugin::new(),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let log_plugin = if args.verbose {
        LogPlugin {
            level: Level::DEBUG,
            filter: "wgpu=error,naga=warn,freebody=debug".to_string(),
            ..default()
        }
    } else {
        LogPlugin::default()
    };

    let window = Window {
        title: config.window.title.clone(),
        resolution: WindowResolution::new(config.window.width, config.window.height),
        ..default()
    };

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(log_plugin)
            .set(WindowPlugin {
                primary_window: Some(window),
                ..default()
            }),
    );

    // Panels must come first: playback reads the config it inserts
    app.add_plugins(PanelsPlugin::with_config(config));
    app.add_plugins((playback, ControlsPlugin, BackendPlugin));

    app.run();
}
