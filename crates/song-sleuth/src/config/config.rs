//! Configuration management for song-sleuth.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{AudioConfig, BehaviourConfig, RecognitionConfig},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Recognition service settings.
    #[serde(default)]
    pub recognition: RecognitionConfig,
    /// Audio capture settings.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behavior: BehaviourConfig,
}

impl Config {
    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    ///
    /// A missing token is not an error here; the app starts and every
    /// recognition attempt reports the service's complaint instead.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `config_path`, creating it with defaults if
    /// absent.
    #[track_caller]
    #[instrument]
    pub fn load_from(config_path: &Path) -> AppResult<Self> {
        if !config_path.exists() {
            info!("No config found, creating default");
            let config = Config::default();
            config.save_to(config_path)?;

            warn!(
                config_path = ?config_path,
                "Default config created. Set [recognition] token before listening."
            );

            return Ok(config);
        }

        let contents = fs::read_to_string(config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        if config.recognition.token.is_empty() {
            warn!(config_path = ?config_path, "Recognition token is not set");
        }

        info!(config_path = ?config_path, "Configuration loaded");

        Ok(config)
    }

    /// Save configuration to `config_path` using the atomic write pattern.
    #[track_caller]
    #[instrument]
    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write_atomic(config_path, &contents)?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Directory holding `history.toml`.
    #[track_caller]
    pub fn data_dir() -> AppResult<PathBuf> {
        let dir = project_dirs()?.data_dir().to_path_buf();
        ensure_dir(&dir)?;
        Ok(dir)
    }

    /// Directory cover images are cached in.
    #[track_caller]
    pub fn cover_cache_dir() -> AppResult<PathBuf> {
        let dir = project_dirs()?.cache_dir().join("covers");
        ensure_dir(&dir)?;
        Ok(dir)
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs()?;
        let config_dir = proj_dirs.config_dir();
        ensure_dir(config_dir)?;

        Ok(config_dir.join("config.toml"))
    }
}

/// Write `contents` to a sibling temp file, sync it, then rename over `path`.
///
/// A crash mid-write leaves either the old file or the new one, never a torn
/// mix.
#[track_caller]
pub(crate) fn write_atomic(path: &Path, contents: &str) -> AppResult<()> {
    let temp_path = path.with_extension("toml.tmp");

    let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
        reason: format!("Failed to create temp file {:?}: {}", temp_path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    temp_file
        .write_all(contents.as_bytes())
        .map_err(|e| AppError::ConfigError {
            reason: format!("Failed to write temp file {:?}: {}", temp_path, e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    temp_file.sync_all().map_err(|e| AppError::ConfigError {
        reason: format!("Failed to sync temp file {:?}: {}", temp_path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
        reason: format!("Failed to rename temp file to {:?}: {}", path, e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(())
}

#[track_caller]
fn project_dirs() -> AppResult<ProjectDirs> {
    ProjectDirs::from("com", "song-sleuth", "Song-Sleuth").ok_or_else(|| AppError::ConfigError {
        reason: "Failed to get project directories".to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn ensure_dir(dir: &Path) -> AppResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        debug!(dir = ?dir, "Created directory");
    }
    Ok(())
}
