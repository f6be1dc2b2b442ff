//! Configuration file support for labelkit.
//!
//! Application settings are stored as pretty-printed JSON under the user's
//! config directory and can also be exported and imported explicitly.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_NUDGE_STEP, HANDLE_PIXELS};
use crate::editor::EditorSettings;
use crate::model::RecentLabels;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the display name for this log level.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "Error",
            LogLevel::Warn => "Warn",
            LogLevel::Info => "Info",
            LogLevel::Debug => "Debug",
            LogLevel::Trace => "Trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Editor preferences
    #[serde(default)]
    pub preferences: EditorPreferences,

    /// Recently used labels, most recent first
    #[serde(default)]
    pub recent_labels: Vec<String>,
}

fn default_app_name() -> String {
    "labelkit".to_string()
}

/// Editor preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorPreferences {
    /// Write the annotation file after every settled change
    #[serde(default = "default_true")]
    pub save_every_change: bool,

    /// Ask for a label right after drawing a shape
    #[serde(default = "default_true")]
    pub auto_name: bool,

    /// On-screen handle size in pixels
    #[serde(default = "default_handle_pixels")]
    pub handle_pixels: f64,

    /// Arrow-key nudge distance in image pixels
    #[serde(default = "default_nudge_step")]
    pub nudge_step: f64,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_true() -> bool {
    true
}

fn default_handle_pixels() -> f64 {
    HANDLE_PIXELS
}

fn default_nudge_step() -> f64 {
    DEFAULT_NUDGE_STEP
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            save_every_change: true,
            auto_name: true,
            handle_pixels: default_handle_pixels(),
            nudge_step: default_nudge_step(),
            log_level: LogLevel::default(),
        }
    }
}

impl EditorPreferences {
    /// Editor tunables, with non-positive sizes replaced by defaults.
    pub fn editor_settings(&self) -> EditorSettings {
        let positive_or = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                log::warn!("Ignoring invalid editor preference {}, using {}", value, fallback);
                fallback
            }
        };
        EditorSettings {
            handle_pixels: positive_or(self.handle_pixels, HANDLE_PIXELS),
            nudge_step: positive_or(self.nudge_step, DEFAULT_NUDGE_STEP),
            auto_name: self.auto_name,
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: EditorPreferences::default(),
            recent_labels: Vec::new(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Recent labels as the editor's label service.
    pub fn recent_labels(&self) -> RecentLabels {
        RecentLabels::from_labels(self.recent_labels.iter().map(String::as_str))
    }

    /// Store the editor's label order for the next run.
    pub fn remember_labels(&mut self, labels: &RecentLabels) {
        self.recent_labels = labels.labels().to_vec();
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "labelkit-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("labelkit").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("labelkit")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path`.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save_to_path(&path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_roundtrip() {
        let mut config = AppConfig::new();
        config.preferences.save_every_change = false;
        config.recent_labels = vec!["dog".into(), "cat".into()];

        let json = config.to_json().expect("serialize");
        let parsed = AppConfig::from_json(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let parsed = AppConfig::from_json(r#"{"version": 1}"#).expect("parse");
        assert_eq!(parsed.app_name, "labelkit");
        assert_eq!(parsed.preferences, EditorPreferences::default());
        assert!(parsed.recent_labels.is_empty());
    }

    #[test]
    fn test_version_too_new() {
        let result = AppConfig::from_json(r#"{"version": 99}"#);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew {
                file_version: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_log_level_serialization() {
        let json = r#"{"version": 1, "preferences": {"log_level": "debug"}}"#;
        let parsed = AppConfig::from_json(json).expect("parse");
        assert_eq!(parsed.preferences.log_level, LogLevel::Debug);
        assert_eq!(
            parsed.preferences.log_level.to_level_filter(),
            log::LevelFilter::Debug
        );
    }

    #[test]
    fn test_invalid_sizes_fall_back_to_defaults() {
        let prefs = EditorPreferences {
            handle_pixels: 0.0,
            nudge_step: -3.0,
            ..EditorPreferences::default()
        };
        let settings = prefs.editor_settings();
        assert_eq!(settings.handle_pixels, HANDLE_PIXELS);
        assert_eq!(settings.nudge_step, DEFAULT_NUDGE_STEP);
    }

    #[test]
    fn test_recent_labels_keep_order() {
        let mut config = AppConfig::new();
        config.recent_labels = vec!["dog".into(), "cat".into()];
        let mut labels = config.recent_labels();
        assert_eq!(labels.most_recent(), Some("dog"));

        labels.touch("bird");
        config.remember_labels(&labels);
        assert_eq!(config.recent_labels, ["bird", "dog", "cat"]);
    }

    #[test]
    fn test_save_and_load_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.json");
        let config = AppConfig::new();
        config.save_to_path(&path).expect("save");
        assert_eq!(AppConfig::load_from_path(&path).expect("load"), config);
    }
}
