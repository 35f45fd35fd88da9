//! Error types for harmattan.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for harmattan operations.
pub type Result<T> = std::result::Result<T, HarmattanError>;

/// Errors that can occur in harmattan.
#[derive(Debug, Error)]
pub enum HarmattanError {
    /// Failed to open a file.
    #[error("Failed to open file: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No usable sonic records were found in the input.
    #[error("No valid sonic records in input ({rejected} line(s) rejected)")]
    EmptyInput { rejected: usize },

    /// A timestamp field could not be parsed.
    #[error("Unparseable timestamp: {text:?}")]
    BadTimestamp { text: String },

    /// An AMF variable table could not be used.
    #[error("AMF variable table error: {message}")]
    VariableTable { message: String },

    /// A required variable definition is incomplete or unsuitable.
    #[error("Variable '{name}': {message}")]
    VariableSpec { name: String, message: String },

    /// No matching data file was found for a tower unit.
    #[error("No {kind} file for unit {unit} under {dir}")]
    NoUnitData {
        kind: &'static str,
        unit: String,
        dir: PathBuf,
    },

    /// Failed to read or write NetCDF.
    #[error("NetCDF error: {0}")]
    NetCDF(String),

    /// CSV reading failed (AMF tables, RHT sensor files).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to load configuration.
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}")]
    ConfigValidation { message: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarmattanError {
    /// Create a FileOpen error.
    pub fn file_open(path: PathBuf, source: std::io::Error) -> Self {
        Self::FileOpen { path, source }
    }

    /// Create a VariableTable error.
    pub fn variable_table(message: impl Into<String>) -> Self {
        Self::VariableTable {
            message: message.into(),
        }
    }

    /// Create a VariableSpec error.
    pub fn variable_spec(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::VariableSpec {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a ConfigValidation error.
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}

impl From<netcdf::Error> for HarmattanError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCDF(err.to_string())
    }
}

impl From<figment::Error> for HarmattanError {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}
