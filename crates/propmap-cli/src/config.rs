//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - The `PROPMAP_CONFIG` environment variable (through `--config`)

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use propmap_core::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Type declarations used when a command has no `--types`
    pub types_file: Option<PathBuf>,

    /// Mapping file used by `convert` when no `--mapping` is given
    pub mapping_file: Option<PathBuf>,

    /// Maximum nesting depth handed to the mapper
    pub max_depth: usize,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format used when `-o` is left at its default
    pub format: String,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,

    /// Include timestamps
    pub timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            types_file: None,
            mapping_file: None,
            max_depth: DEFAULT_MAX_DEPTH,
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: None,
            file: None,
            timestamps: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load configuration");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("propmap.yaml"), PathBuf::from("propmap.json")];

        if let Some(config_dir) = dirs::config_dir() {
            let propmap_dir = config_dir.join("propmap");
            paths.push(propmap_dir.join("config.yaml"));
            paths.push(propmap_dir.join("config.json"));
        }

        paths
    }

    /// Reject settings no command could run with
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(Error::config("max_depth must be at least 1"));
        }
        self.output_format()?;
        Ok(())
    }

    /// Configured default output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        self.output
            .format
            .parse()
            .map_err(|_| Error::config(format!("Unknown output format '{}'", self.output.format)))
    }
}

/// Whether `path` names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false)
}
