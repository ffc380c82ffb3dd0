//! Configuration loading errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("KDL parse error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("unknown stage '{name}' at plugins[{index}]: no registered collaborator")]
    UnknownStage { index: usize, name: String },

    #[error("no release configuration found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is structurally invalid or mistyped.
    ConfigInvalid,
    /// A stage identifier has no registered collaborator.
    UnknownStage,
    /// The document could not be found or read.
    Io,
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Kdl(_)
            | ConfigError::Json(_)
            | ConfigError::MissingField(_)
            | ConfigError::InvalidValue { .. } => ErrorKind::ConfigInvalid,
            ConfigError::UnknownStage { .. } => ErrorKind::UnknownStage,
            ConfigError::NotFound(_) | ConfigError::Io { .. } => ErrorKind::Io,
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
