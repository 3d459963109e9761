//! Dashboard configuration.
//!
//! Stored in JSON format at `~/.portslay/config.json`. Every field has a
//! default, so a missing or partial file is valid.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Name of the per-user directory holding config, stats and logs.
pub const APP_DIR: &str = ".portslay";

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Port scan refresh interval in milliseconds.
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// How long kill feedback stays on screen, in milliseconds.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,

    /// Initial sort key (`port`, `process`, `pid` or `user`).
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Show the details strip on startup.
    #[serde(default)]
    pub show_details: bool,

    /// Ask before killing.
    #[serde(default = "default_true")]
    pub confirm_kills: bool,
}

fn default_refresh_interval_ms() -> u64 {
    2000
}

fn default_toast_duration_ms() -> u64 {
    3000
}

fn default_sort() -> String {
    "port".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
            toast_duration_ms: default_toast_duration_ms(),
            default_sort: default_sort(),
            show_details: false,
            confirm_kills: true,
        }
    }
}

/// Resolve `~/.portslay/<file>`.
pub fn app_file(file: &str) -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
    Ok(home.join(APP_DIR).join(file))
}

/// Read a JSON file, returning `T::default()` when it does not exist.
pub(crate) async fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a JSON file atomically by writing to a temp file then renaming.
///
/// Creates the parent directory if it doesn't exist.
pub(crate) async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create directory: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("json.tmp");

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| Error::Config(format!("Failed to create temp file: {}", e)))?;

    file.write_all(content.as_bytes())
        .await
        .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))?;

    file.sync_all()
        .await
        .map_err(|e| Error::Config(format!("Failed to sync {}: {}", path.display(), e)))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| Error::Config(format!("Failed to rename {}: {}", path.display(), e)))?;

    Ok(())
}

/// Configuration store for dashboard settings.
///
/// Handles reading and writing configuration to `~/.portslay/config.json`.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: app_file("config.json")?,
        })
    }

    /// Create a config store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        read_json_or_default(&self.config_path).await
    }

    /// Save configuration to disk.
    pub async fn save(&self, config: &Config) -> Result<()> {
        write_json_atomic(&self.config_path, config).await
    }
}
