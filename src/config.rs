use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default playlist list, looked up in the working directory first.
pub const DEFAULT_PLAYLISTS_FILE: &str = "playlists.json";

/// A tracked playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSpec {
    /// Provider playlist id.
    pub id: String,
    /// Display name; the snapshot document is stored as `<name>.md`.
    pub name: String,
}

/// TOML layout: a list of `[[playlist]]` tables.
#[derive(Debug, Deserialize)]
struct TomlPlaylists {
    #[serde(default)]
    playlist: Vec<PlaylistSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub playlists: Vec<PlaylistSpec>,
}

impl Config {
    /// Load the playlist list from a JSON array, or from `[[playlist]]` tables when the
    /// file has a `.toml` extension.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let malformed = |reason: String| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason,
        };

        let playlists = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str::<TomlPlaylists>(&contents)
                .map_err(|e| malformed(e.to_string()))?
                .playlist
        } else {
            serde_json::from_str::<Vec<PlaylistSpec>>(&contents)
                .map_err(|e| malformed(e.to_string()))?
        };

        let config = Self { playlists };
        config.validate()?;
        Ok(config)
    }

    /// Fallback location in the user's config directory.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("playlist-changelog").join(DEFAULT_PLAYLISTS_FILE))
    }

    /// Load `playlists.json` from the working directory, falling back to the config dir.
    pub fn load() -> Result<Self, ConfigError> {
        let local = PathBuf::from(DEFAULT_PLAYLISTS_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        match Self::config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            Some(path) => Err(ConfigError::NotFound(format!(
                "{} and {}",
                local.display(),
                path.display()
            ))),
            None => Err(ConfigError::NotFound(local.display().to_string())),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for (index, playlist) in self.playlists.iter().enumerate() {
            let invalid = |reason: &str| ConfigError::InvalidPlaylist {
                index,
                reason: reason.to_string(),
            };
            if playlist.id.trim().is_empty() {
                return Err(invalid("id is empty"));
            }
            if playlist.name.trim().is_empty() {
                return Err(invalid("name is empty"));
            }
            if playlist.name.contains('/') {
                return Err(invalid("name must not contain `/`"));
            }
            // The name is written into the snapshot heading line.
            if playlist.name.chars().any(char::is_control) {
                return Err(invalid("name must not contain control characters"));
            }
            if !names.insert(playlist.name.as_str()) {
                return Err(ConfigError::DuplicatePlaylist(playlist.name.clone()));
            }
        }
        Ok(())
    }
}

/// Secrets for the two remote collaborators.
#[derive(Clone)]
pub struct Credentials {
    /// YouTube Data API key.
    pub api_key: String,
    /// Gist id holding the snapshots.
    pub store_id: String,
    /// GitHub token allowed to edit the gist.
    pub access_token: String,
}

impl Credentials {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingCredential("YOUTUBE_API_KEY"));
        }
        if self.store_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("GIST_ID"));
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingCredential("PAT"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("store_id", &self.store_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
