//! Error types for settings.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors that can occur while loading, flattening or updating settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid config path {path:?}: {reason}")]
    InvalidConfigPath { path: PathBuf, reason: String },

    #[error("Failed to parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot traverse settings: {0}")]
    Traversal(String),

    #[error("Setting '{name}' is not a string (found {found})")]
    TypeMismatch { name: String, found: &'static str },

    #[error("Cannot write setting '{name}': {reason}")]
    Write { name: String, reason: String },

    #[error("Setting '{name}' is required: {hint}")]
    Required { name: String, hint: String },
}
