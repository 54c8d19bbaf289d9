//! Configuration for GCodeMeter
//!
//! Provides configuration file handling and validation for estimation
//! passes. Supports JSON and TOML files stored in the platform config
//! directory.
//!
//! Configuration is organized into sections:
//! - Machine axes and kinematic limits
//! - Processing settings (arc sampling, diagnostics, progress)
//! - Output preferences

use gcodemeter_core::{ConfigError, MachineLimits, Result};
use gcodemeter_estimator::{ProcessorOptions, DEFAULT_ARC_DIVISIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name under the platform config directory
const APP_DIR: &str = "gcodemeter";

/// Default config file name
const CONFIG_FILE: &str = "config.toml";

/// Estimation pass settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Samples per arc for bounding boxes
    pub arc_divisions: usize,
    /// Skipped lines reported individually
    pub max_reported_errors: usize,
    /// Lines between progress reports (0 disables them)
    pub progress_interval: u64,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            arc_divisions: DEFAULT_ARC_DIVISIONS,
            max_reported_errors: 100,
            progress_interval: 1000,
        }
    }
}

/// Output preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty-print the JSON result
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Format of a config file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.display().to_string(),
            }
            .into()),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Axis labels and limits
    pub machine: MachineLimits,
    /// Estimation settings
    pub processing: ProcessingSettings,
    /// Output preferences
    pub output: OutputSettings,
}

impl Config {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let format = FileFormat::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            FileFormat::Json => serde_json::from_str(&content).map_err(|e| {
                ConfigError::Malformed {
                    reason: e.to_string(),
                }
            })?,
            FileFormat::Toml => toml::from_str(&content).map_err(|e| ConfigError::Malformed {
                reason: e.to_string(),
            })?,
        };

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = match FileFormat::of(path)? {
            FileFormat::Json => serde_json::to_string_pretty(self).map_err(|e| {
                ConfigError::Malformed {
                    reason: e.to_string(),
                }
            })?,
            FileFormat::Toml => toml::to_string_pretty(self).map_err(|e| {
                ConfigError::Malformed {
                    reason: e.to_string(),
                }
            })?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the default config file, or defaults when it does not exist
    pub fn load_or_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config file location in the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.machine.validate()?;

        if self.processing.arc_divisions == 0 {
            return Err(ConfigError::InvalidValue {
                setting: "processing.arc_divisions".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Options for an estimation pass
    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions::new(self.machine.clone())
            .with_arc_divisions(self.processing.arc_divisions)
            .with_max_reported_errors(self.processing.max_reported_errors)
            .with_progress_interval(self.processing.progress_interval)
    }
}
