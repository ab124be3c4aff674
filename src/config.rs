use crate::physics::forces::ForceHeuristics;
use crate::render::free_body::FreeBodySettings;
use crate::render::scene::SceneSettings;
use crate::render::time_series::SamplingSettings;
use bevy::prelude::*;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides, e.g. `FREEBODY__SCENE__GRID_SPACING=10`
pub const ENV_PREFIX: &str = "FREEBODY";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct PanelsConfig {
    pub window: WindowConfig,
    pub display: DisplayConfig,
    pub scene: SceneSettings,
    pub free_body: FreeBodySettings,
    pub forces: ForceHeuristics,
    pub sampling: SamplingSettings,
    pub playback: PlaybackConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1260.0,
            height: 870.0,
            title: "Freebody".to_string(),
        }
    }
}

/// Initial state of the scene toggles.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_grid: bool,
    pub show_vectors: bool,
    pub zoom: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_vectors: true,
            zoom: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Start over from the first snapshot after the last one
    pub looping: bool,
    pub start_paused: bool,
    /// JSON-lines snapshot file; the built-in demo runs when unset
    pub snapshot_file: Option<PathBuf>,
    /// Length of the built-in demo, in seconds
    pub demo_duration: f64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            looping: true,
            start_paused: false,
            snapshot_file: None,
            demo_duration: 6.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(toml::de::Error),
    Layered(config::ConfigError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "could not read config file: {e}"),
            ConfigError::Parse(e) => write!(f, "invalid config file: {e}"),
            ConfigError::Layered(e) => write!(f, "invalid layered configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Layered(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Read(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Layered(e)
    }
}

impl PanelsConfig {
    /// Reads and parses one TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from a file, falling back to defaults if the file
    /// is missing or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Read(_)) => {
                info!("Config file {} not found. Using defaults.", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("{}: {e}. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    /// Per-user config file location, if the platform has one.
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "freebody").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// The per-user file (when present) overlaid with `FREEBODY__*`
    /// environment variables.
    pub fn load_layered(user_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = user_file {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let layered = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(layered.try_deserialize()?)
    }

    pub fn load_from_user_config() -> Self {
        let path = Self::user_config_path();
        match Self::load_layered(path.as_deref()) {
            Ok(config) => {
                if let Some(path) = path.filter(|path| path.exists()) {
                    info!("Loaded configuration from {}", path.display());
                }
                config
            }
            Err(e) => {
                warn!("{e}. Using defaults.");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("freebody-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: PanelsConfig = toml::from_str(
            r#"
            [scene]
            grid_spacing = 10.0

            [forces]
            tension_speed_divisor = 20.0
            "#,
        )
        .unwrap();

        assert_eq!(config.scene.grid_spacing, 10.0);
        assert_eq!(config.scene.velocity_scale, 4.0);
        assert_eq!(config.forces.tension_speed_divisor, 20.0);
        assert_eq!(config.forces.applied_scale, 0.5);
        assert_eq!(config.free_body, FreeBodySettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = scratch_dir("save");
        let path = dir.join("nested").join("config.toml");

        let mut config = PanelsConfig::default();
        config.display.show_grid = false;
        config.sampling.fixed_step = 0.02;
        config.save(&path).unwrap();

        let loaded = PanelsConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = PanelsConfig::load_or_default("/definitely/not/here/freebody.toml");
        assert_eq!(config, PanelsConfig::default());
        assert!(matches!(
            PanelsConfig::load("/definitely/not/here/freebody.toml"),
            Err(ConfigError::Read(_))
        ));
    }

    #[test]
    fn test_invalid_file_is_a_parse_error() {
        let dir = scratch_dir("invalid");
        let path = dir.join("config.toml");
        std::fs::write(&path, "[scene\ngrid_spacing = ").unwrap();

        assert!(matches!(
            PanelsConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(PanelsConfig::load_or_default(&path), PanelsConfig::default());

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_layered_file() {
        let dir = scratch_dir("layered");
        let path = dir.join("config.toml");
        std::fs::write(&path, "[free_body]\nforce_scale = 5.0\n").unwrap();

        let config = PanelsConfig::load_layered(Some(&path)).unwrap();
        assert_eq!(config.free_body.force_scale, 5.0);
        assert_eq!(config.free_body.max_arrow_length, 80.0);

        std::fs::remove_dir_all(dir).ok();
    }
}
