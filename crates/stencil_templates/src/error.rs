//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while parsing or executing a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Error parsing template '{template}': {message}")]
    Parse { template: String, message: String },

    #[error("Error executing template '{template}': {message}")]
    Exec { template: String, message: String },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TemplateError {
    pub(crate) fn parse(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            template: template.into(),
            message: message.into(),
        }
    }

    pub(crate) fn exec(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exec {
            template: template.into(),
            message: message.into(),
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_exec(&self) -> bool {
        matches!(self, Self::Exec { .. })
    }
}
