//! TOML-backed persistent settings for the session controller.

use crate::config::write_atomic;

use song_sleuth_core::{CoreError, CoreResult, PersistedSong, SettingsStore};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// File name of the song history inside the data directory.
pub const HISTORY_FILE_NAME: &str = "history.toml";

/// On-disk layout of `history.toml`: an ordered `[[songs]]` array, most
/// recent first.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    songs: Vec<PersistedSong>,
}

/// Song history in `history.toml`, token from `config.toml`.
pub struct TomlSettingsStore {
    history_path: PathBuf,
    token: String,
}

impl TomlSettingsStore {
    /// Store reading and writing history at `history_path`.
    pub fn new(history_path: PathBuf, token: String) -> Self {
        Self {
            history_path,
            token,
        }
    }

    /// Path of the history file.
    pub fn history_path(&self) -> &Path {
        &self.history_path
    }
}

impl SettingsStore for TomlSettingsStore {
    #[track_caller]
    #[instrument(skip(self), fields(history_path = ?self.history_path))]
    fn memory_list(&self) -> CoreResult<Vec<PersistedSong>> {
        if !self.history_path.exists() {
            debug!("No history file yet");
            return Ok(Vec::new());
        }

        let contents =
            fs::read_to_string(&self.history_path).map_err(|e| CoreError::SettingsError {
                reason: format!("Failed to read history: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let history: HistoryFile =
            toml::from_str(&contents).map_err(|e| CoreError::SettingsError {
                reason: format!("Failed to parse history: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(song_count = history.songs.len(), "History loaded");

        Ok(history.songs)
    }

    #[track_caller]
    #[instrument(skip(self, songs), fields(history_path = ?self.history_path, song_count = songs.len()))]
    fn set_memory_list(&mut self, songs: &[PersistedSong]) -> CoreResult<()> {
        let history = HistoryFile {
            songs: songs.to_vec(),
        };

        let contents = toml::to_string_pretty(&history).map_err(|e| CoreError::SettingsError {
            reason: format!("Failed to serialize history: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write_atomic(&self.history_path, &contents).map_err(|e| CoreError::SettingsError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("History saved (atomic write)");

        Ok(())
    }

    fn token(&self) -> String {
        self.token.clone()
    }
}
