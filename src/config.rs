use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default database file, relative to the working directory.
const DEFAULT_DB_FILE: &str = "users.db";

/// Config file name inside the per-user config directory.
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding the `users` table.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE),
        }
    }
}

impl Config {
    /// Parse a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load an explicit config file, or the per-user default if it exists,
    /// or fall back to built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading user config");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// `<config dir>/userreg/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "userreg")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
