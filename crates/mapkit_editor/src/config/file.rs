//! Reading and writing the editor config file
//!
//! The file is `config.json` in the platform config directory, or the path
//! named by the `MAPKIT_CONFIG` environment variable.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use mapkit_core::MAX_MAP_SIZE;

use super::EditorConfig;

const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "MAPKIT_CONFIG";

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists but could not be read
    Read { path: PathBuf, source: io::Error },
    /// The file or its directory could not be written
    Write { path: PathBuf, source: io::Error },
    /// The file is not valid config JSON
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Encode(serde_json::Error),
    /// The values parse but cannot start a session
    Invalid(String),
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Cannot read {}: {}", path.display(), source)
            }
            ConfigError::Write { path, source } => {
                write!(f, "Cannot write {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "{} is not a valid config: {}", path.display(), source)
            }
            ConfigError::Encode(e) => write!(f, "Cannot encode config: {}", e),
            ConfigError::Invalid(reason) => write!(f, "Invalid config: {}", reason),
            ConfigError::NoConfigDir => write!(f, "No config directory on this platform"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } | ConfigError::Write { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::Encode(e) => Some(e),
            ConfigError::Invalid(_) | ConfigError::NoConfigDir => None,
        }
    }
}

fn resolve_path(env_override: Option<OsString>) -> Option<PathBuf> {
    if let Some(path) = env_override.filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    ProjectDirs::from("com", "mapkit", "mapkit").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl EditorConfig {
    /// Location of the user's config file
    pub fn config_path() -> Option<PathBuf> {
        resolve_path(std::env::var_os(CONFIG_ENV))
    }

    /// Load the user's configuration, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::warn!("{}. Using default editor config.", ConfigError::NoConfigDir);
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_else(|e| {
            tracing::warn!("{}. Using default editor config.", e);
            Self::default()
        })
    }

    /// Load and check a config file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Reject values a session cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = (self.map_width, self.map_height);
        if w == 0 || h == 0 || w > MAX_MAP_SIZE || h > MAX_MAP_SIZE {
            return Err(ConfigError::Invalid(format!(
                "map size {}x{} outside 1..={}",
                w, h, MAX_MAP_SIZE
            )));
        }
        if let Some(tileset) = &self.tileset {
            if tileset.tile_width == 0 || tileset.tile_height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "tileset '{}' has a zero tile size",
                    tileset.name
                )));
            }
        }
        Ok(())
    }

    /// Save to the user's config file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Write the config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Encode)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)?;

        tracing::info!("Saved editor config to {}", path.display());
        Ok(())
    }
}
