//! Configuration type definitions.

use crate::capture::clipboard::DEFAULT_MAX_PAYLOAD;
use crate::locate::file::DEFAULT_MARKERS;
use serde::{Deserialize, Serialize};

/// Clipboard-vs-file arbitration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrationConfig {
    /// Files modified within this many seconds beat the clipboard (valid range: 1 - 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

/// File lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    /// Substrings that mark a file name as a screenshot (case-insensitive)
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
        }
    }
}

/// Clipboard capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Largest accepted clipboard image in MiB (valid range: 1 - 1024)
    #[serde(default = "default_max_payload_mib")]
    pub max_payload_mib: u64,
}

impl ClipboardConfig {
    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_mib * 1024 * 1024
    }
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            max_payload_mib: default_max_payload_mib(),
        }
    }
}

/// Temp file naming.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempConfig {
    /// File name prefix for everything written to the temp directory
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for TempConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

pub(super) fn default_window_secs() -> u64 {
    30
}

pub(super) fn default_markers() -> Vec<String> {
    DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect()
}

pub(super) fn default_max_payload_mib() -> u64 {
    DEFAULT_MAX_PAYLOAD / (1024 * 1024)
}

pub(super) fn default_prefix() -> String {
    "shotgrab".to_string()
}
