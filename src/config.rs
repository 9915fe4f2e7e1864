//! Configuration management for Rollog

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::console::ConsoleColor;
use crate::logging::{WriterSettings, DEFAULT_THRESHOLD_BYTES};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Size in bytes at which a log file is archived (default: 5 MiB)
    #[serde(default = "default_threshold_bytes")]
    pub threshold_bytes: u64,

    /// Pause in milliseconds between archiving a log and creating its replacement (default: 250)
    #[serde(default = "default_rollover_pause_ms")]
    pub rollover_pause_ms: u64,

    /// Color used for `--echo` when `--color` is not given
    #[serde(default)]
    pub default_color: ConsoleColor,

    /// Archives to keep per log file; unset keeps every archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_archives: Option<usize>,
}

fn default_threshold_bytes() -> u64 {
    DEFAULT_THRESHOLD_BYTES
}

fn default_rollover_pause_ms() -> u64 {
    250
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold_bytes: default_threshold_bytes(),
            rollover_pause_ms: default_rollover_pause_ms(),
            default_color: ConsoleColor::default(),
            max_archives: None,
        }
    }
}

impl Config {
    /// Load configuration from the default file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from `path`, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Writer settings described by this configuration
    pub fn writer_settings(&self) -> WriterSettings {
        WriterSettings {
            threshold_bytes: self.threshold_bytes,
            rollover_pause: Duration::from_millis(self.rollover_pause_ms),
            max_archives: self.max_archives,
        }
    }
}

/// Get the base configuration directory (~/.rollog)
/// Falls back to ./.rollog if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".rollog")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".rollog"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}
