//! Configuration management for tabula.
//!
//! This module handles loading and validating the user configuration:
//! application settings and the CSV dialect.
//!
//! The configuration file lives at `<config dir>/tabula/config.toml`
//! unless `TABULA_CONFIG` points somewhere else. A missing file means
//! defaults.

mod settings;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::table::csv::CsvOptions;

pub use settings::Settings;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "TABULA_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration: {0}")]
    ReadError(#[source] io::Error),

    /// The configuration file is not valid TOML for [`Config`].
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A value is present but not acceptable.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// The full configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub settings: Settings,
    /// CSV dialect for load and save.
    pub csv: CsvOptions,
}

impl Config {
    /// Load the configuration from its default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the configuration from `path`, falling back to defaults if the
    /// file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::ReadError(e)),
        };

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Path of the configuration file.
    ///
    /// `TABULA_CONFIG` wins over the platform configuration directory.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(base.join("tabula").join("config.toml"))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if !self.csv.delimiter.is_ascii() || matches!(self.csv.delimiter, '\n' | '\r' | '"') {
            return Err(ConfigError::ValidationError(format!(
                "delimiter {:?} must be a single ASCII character other than a quote or newline",
                self.csv.delimiter
            )));
        }

        Ok(())
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
