//! Configuration file support for shotgrab.
//!
//! Settings are read from `~/.config/shotgrab/config.toml` (or
//! `$XDG_CONFIG_HOME/shotgrab/config.toml`). The file is optional; if it is
//! missing every setting keeps its default.

pub mod types;

pub use types::{ArbitrationConfig, ClipboardConfig, LocatorConfig, TempConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [arbitration]
/// window_secs = 30
///
/// [locator]
/// markers = ["screenshot", "screen shot", "bildschirmfoto"]
///
/// [clipboard]
/// max_payload_mib = 50
///
/// [temp]
/// prefix = "shotgrab"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub arbitration: ArbitrationConfig,

    #[serde(default)]
    pub locator: LocatorConfig,

    #[serde(default)]
    pub clipboard: ClipboardConfig,

    #[serde(default)]
    pub temp: TempConfig,
}

impl Config {
    /// Clamp out-of-range values and replace unusable ones with defaults.
    ///
    /// Validated ranges:
    /// - `arbitration.window_secs`: 1 - 3600
    /// - `clipboard.max_payload_mib`: 1 - 1024
    /// - `locator.markers`: at least one non-empty marker
    /// - `temp.prefix`: non-empty, no path separators
    fn validate_and_clamp(&mut self) {
        if !(1..=3600).contains(&self.arbitration.window_secs) {
            log::warn!(
                "Invalid window_secs {}, clamping to 1-3600 range",
                self.arbitration.window_secs
            );
            self.arbitration.window_secs = self.arbitration.window_secs.clamp(1, 3600);
        }

        if !(1..=1024).contains(&self.clipboard.max_payload_mib) {
            log::warn!(
                "Invalid max_payload_mib {}, clamping to 1-1024 range",
                self.clipboard.max_payload_mib
            );
            self.clipboard.max_payload_mib = self.clipboard.max_payload_mib.clamp(1, 1024);
        }

        self.locator.markers.retain(|m| !m.trim().is_empty());
        if self.locator.markers.is_empty() {
            log::warn!("No usable screenshot markers configured, using defaults");
            self.locator.markers = types::default_markers();
        }

        let prefix = &self.temp.prefix;
        if prefix.is_empty() || prefix.contains(['/', '\\']) {
            log::warn!("Invalid temp prefix '{}', falling back to 'shotgrab'", prefix);
            self.temp.prefix = types::default_prefix();
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.arbitration.window_secs)
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("shotgrab");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `config_path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }
}
