use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while counting words or tallying keywords
#[derive(Error, Debug)]
pub enum WordCountError {
    /// Rejected at construction time, before any I/O
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not read configuration file {path:?}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("could not find setup file at {path:?}")]
    MissingCheckpoint {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid setup file at {path:?}: missing column {column}")]
    Schema { path: PathBuf, column: String },

    #[error("invalid setup file at {path:?}: {reason}")]
    CheckpointFormat { path: PathBuf, reason: String },

    #[error("failed to read document {path:?}: {reason}")]
    DocumentRead { path: PathBuf, reason: String },

    #[error("CSV error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, WordCountError>;

impl WordCountError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn document(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DocumentRead {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
