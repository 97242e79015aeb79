//! Centralized error types for tabula.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

use crate::config::ConfigError;
use crate::table::TableError;

/// The main application error type.
///
/// Aggregates table and configuration failures, keeping the underlying
/// error for logs while offering a short message for the terminal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Table operation errors.
    #[error("{0}")]
    Table(#[from] TableError),

    /// IO errors outside table load/save (terminal, stdin).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The user named a column or command that does not exist.
    #[error("{0}")]
    Usage(String),

    /// Generic errors with a message.
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        AppError::Usage(msg.into())
    }

    /// Create a generic error.
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }

    /// Get a user-friendly message for display.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError(_) => {
                    "Could not read configuration file. Please check it is readable.".to_string()
                }
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::SerializeError(_) => {
                    "Could not render configuration. Internal error.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            AppError::Table(e) => match e {
                TableError::ShapeMismatch { expected, found } => {
                    format!("Expected {} values but got {}.", expected, found)
                }
                TableError::IndexOutOfRange { index, len } => {
                    format!("Column {} does not exist; the table has {} columns.", index, len)
                }
                TableError::NotFound { key, .. } => format!("Data not found: '{}'.", key),
                TableError::MissingHeader => "The file is empty: no header line.".to_string(),
                TableError::MalformedLine {
                    line,
                    expected,
                    found,
                } => format!(
                    "Line {} has {} values, expected {}. Is there a comma inside a value?",
                    line, found, expected
                ),
                TableError::LineBreakInField { line, column } => format!(
                    "A value in column {} of line {} contains a line break.",
                    column, line
                ),
                TableError::Io(_) | TableError::Csv(_) => {
                    "A file operation failed. Please check the path and permissions.".to_string()
                }
            },
            AppError::Io(_) => "A terminal operation failed.".to_string(),
            AppError::Usage(msg) => msg.clone(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// Check if the session can carry on after this error.
    ///
    /// Every table failure leaves the in-memory table untouched.
    /// Configuration and terminal failures end the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Usage(_) | AppError::Table(_))
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::Config(ConfigError::ParseError(_))
            | AppError::Config(ConfigError::ValidationError(_)) => {
                Some("Run 'tabula config' to see the effective configuration.")
            }
            AppError::Table(TableError::MalformedLine { .. }) => {
                Some("Set 'quoting = true' under [csv] if the file uses quoted values.")
            }
            AppError::Table(TableError::LineBreakInField { .. }) => {
                Some("Set 'quoting = true' under [csv] to store line breaks, or edit the value.")
            }
            AppError::Table(TableError::ShapeMismatch { .. }) => {
                Some("Run 'tabula show' to see the column headers.")
            }
            _ => None,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
