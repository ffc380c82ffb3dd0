//! Error types for collaborators and release runs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },
}

impl Error {
    /// Build a stage failure from anything displayable.
    pub fn stage_failed(stage: impl Into<String>, message: impl ToString) -> Self {
        Error::StageFailed {
            stage: stage.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
