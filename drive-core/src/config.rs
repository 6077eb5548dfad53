//! src/config.rs
//! ============================================================================
//! # Config: Drive Client Configuration Loader and Saver
//!
//! Manages the user-editable settings of the drive client. Settings are kept
//! as TOML in the platform config directory resolved through
//! [`directories`](https://docs.rs/directories).
//!
//! ## Features
//! - XDG-compliant config discovery and writing (Linux, macOS, Windows)
//! - Defaulting for every missing table or field
//! - Async load/save for smooth integration with Tokio
//! - Human readable durations (`"1s 500ms"`) for the debounce settle windows
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! config.save().await?;
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use tokio::fs as TokioFs;

use crate::error::AppError;
use crate::logging::LoggerConfig;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "drive";
const APPLICATION: &str = "DriveClient";

/// Quiet periods of the debounced concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// How long a listing may stay outstanding before the loading overlay shows.
    #[serde(with = "humantime_serde")]
    pub loading_overlay: Duration,

    /// Notifications disappear after this much quiet time.
    #[serde(with = "humantime_serde")]
    pub notification: Duration,

    /// Typing pause before an explore address is resolved.
    #[serde(with = "humantime_serde")]
    pub address_check: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            loading_overlay: Duration::from_millis(1500),
            notification: Duration::from_millis(1000),
            address_check: Duration::from_millis(750),
        }
    }
}

/// Where the local backend keeps its trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Root of the user's own drive.
    pub root: PathBuf,

    /// Directory holding one sub-directory per resolvable public address.
    pub public_dir: PathBuf,

    /// File the resolved roots are stored in between sessions.
    pub roots_file: PathBuf,

    /// List dot-files as well.
    pub show_hidden: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        let data_dir = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map_or_else(|| PathBuf::from("."), |dirs| dirs.data_dir().to_path_buf());

        Self {
            root: data_dir.join("drive"),
            public_dir: data_dir.join("public"),
            roots_file: data_dir.join("roots.json"),
            show_hidden: false,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub drive: DriveConfig,

    #[serde(default)]
    pub debounce: DebounceConfig,

    #[serde(default)] // Backward compatibility - use default if missing
    pub logging: LoggerConfig,
}

impl Config {
    /// Loads config from TOML file at the XDG-compliant app config dir, or returns defaults.
    ///
    /// The config is expected at `$XDG_CONFIG_HOME/DriveClient/config.toml`
    /// (Linux), or equivalent on Windows/macOS.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            info!("Loading config from {}", path.display());
            Ok(Self::load_from(&path).await?)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save().await?;

            Ok(default_config)
        }
    }

    /// Reads and parses a config file at an explicit location.
    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        let text = TokioFs::read_to_string(path)
            .await
            .map_err(|source| AppError::ConfigIo {
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_toml_str(&text)
    }

    /// Parses config text; missing tables fall back to their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(text)?)
    }

    /// Saves config to TOML file at the XDG-compliant app config dir.
    pub async fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;

        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(&path, toml_str).await?;

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the config directory (without filename).
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
