//! Error types for the core pipeline.

use std::path::PathBuf;

use stencil_settings::SettingsError;
use stencil_templates::TemplateError;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while negotiating overrides or materializing a
/// template.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Override input failed: {0}")]
    Input(#[source] std::io::Error),

    #[error("Error rendering path {path:?}: {source}")]
    PathRender {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("Error processing file {path:?}: {source}")]
    ContentRender {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("Rendered path {rendered:?} for {path:?} is not a relative path inside the output directory")]
    UnsafeTargetPath { path: PathBuf, rendered: String },

    #[error("Error making directory {path:?}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating file at {path:?}: {source}")]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error while walking into {path:?}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Fetch error: {0}")]
    Fetch(String),
}

impl CoreError {
    /// The template error behind a path or content render failure.
    pub fn template_error(&self) -> Option<&TemplateError> {
        match self {
            CoreError::PathRender { source, .. } | CoreError::ContentRender { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}
