// Recoverable error kinds for collection, logging and history reads.
// Startup errors go through anyhow in main; nothing here is fatal.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    /// Metrics provider failed; the sample is dropped.
    #[error("metrics acquisition failed ({operation}): {message}")]
    Acquisition {
        operation: &'static str,
        message: String,
    },

    #[error("I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no {column} column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// File name is not `system_stats_YYYY-MM-DD.csv`.
    #[error("unexpected log file name {name}")]
    FilenamePattern { name: String },

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CollectError {
    pub(crate) fn acquisition(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Acquisition {
            operation,
            message: err.to_string(),
        }
    }

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
}

pub type Result<T, E = CollectError> = std::result::Result<T, E>;
