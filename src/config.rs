// src/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Hide the source's visual display at attach time; only the data is collected.
    pub hide_overlay: bool,
    /// Upper bound on frame-rate samples held between two snapshots.
    pub max_buffered_samples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub default_path: Option<PathBuf>,
    /// chrono format for the timestamp column of exported rows.
    pub timestamp_format: String,
    /// chrono format for the `[..]` prefix of the single-line rendering.
    pub line_time_format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub monitor: MonitorConfig,
    pub export: ExportConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            hide_overlay: true,
            max_buffered_samples: 4096,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            default_path: None,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            line_time_format: "%H:%M:%S".to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Data collection only, the source's display stays hidden.
    pub fn headless() -> Self {
        TrackerConfig::default()
    }

    /// Keeps the source's display on screen while collecting.
    pub fn visible() -> Self {
        let mut config = TrackerConfig::default();
        config.monitor.hide_overlay = false;
        config
    }

    pub fn with_default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export.default_path = Some(path.into());
        self
    }
}
