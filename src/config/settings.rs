//! Application settings configuration.

use serde::{Deserialize, Serialize};

use super::{ConfigError, Result};
use crate::table::DEFAULT_HEADERS;

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Headers for a table created from scratch.
    pub default_headers: Vec<String>,
    /// Column identifying a row for update and delete.
    pub key_column: usize,
    /// File used when no `--file` is given.
    pub default_file: String,
    /// Where `search --export` writes when no path is given.
    pub search_export_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_headers: DEFAULT_HEADERS.iter().map(|h| h.to_string()).collect(),
            key_column: 0,
            default_file: "output.csv".to_string(),
            search_export_file: "search_results.csv".to_string(),
        }
    }
}

impl Settings {
    /// Validate these settings.
    ///
    /// Checks that:
    /// - There is at least one default header
    /// - The key column exists in the default headers
    /// - The file names are non-empty
    pub fn validate(&self) -> Result<()> {
        if self.default_headers.is_empty() {
            return Err(ConfigError::ValidationError(
                "default_headers cannot be empty".to_string(),
            ));
        }

        if self.key_column >= self.default_headers.len() {
            return Err(ConfigError::ValidationError(format!(
                "key_column {} is outside the {} default headers",
                self.key_column,
                self.default_headers.len()
            )));
        }

        if self.default_file.trim().is_empty() || self.search_export_file.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "file names cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
