use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("invalid base URL: {0}")]
    InvalidBase(String),
    #[error("base URL cannot carry a path: {0}")]
    CannotBeABase(String),
    #[error("failed to build source URL `{input}`: {reason}")]
    Join { input: String, reason: String },
}

pub type SourceResult<T> = Result<T, SourceError>;
