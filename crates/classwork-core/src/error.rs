//! Error types shared by every core operation.
//!
//! Every variant is recoverable at the operation boundary: callers report the
//! message and return control to the enclosing menu or session.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the stores, the answering session, and the aggregator.
#[derive(Debug, Error)]
pub enum ClassworkError {
    /// JSON parsed, but did not match the entity schema.
    #[error("corrupt data in {}: offending fields: {}", path.display(), fields.join(", "))]
    DataCorrupt { path: PathBuf, fields: Vec<String> },

    /// A list, class, user, or progress record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Input outside the accepted set (answer letter, field value, command).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing a store file failed.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Short name for an error kind, used in log fields and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DataCorrupt,
    NotFound,
    InvalidInput,
    IoFailure,
}

impl ClassworkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassworkError::DataCorrupt { .. } => ErrorKind::DataCorrupt,
            ClassworkError::NotFound(_) => ErrorKind::NotFound,
            ClassworkError::InvalidInput(_) => ErrorKind::InvalidInput,
            ClassworkError::Io { .. } => ErrorKind::IoFailure,
        }
    }

    /// Returns `true` if the caller can keep going after reporting the error.
    ///
    /// No error kind is fatal to the process.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    /// Returns `true` if retrying the same input cannot succeed.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ClassworkError::InvalidInput(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClassworkError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, ClassworkError>;
