//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add session-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("line {line}: unknown alias '@{alias}'")]
    UnknownAlias { line: usize, alias: String },

    #[error("line {line}: {source}")]
    Step {
        line: usize,
        #[source]
        source: DomainError,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
