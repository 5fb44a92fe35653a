//! Error types shared across the workspace tooling and the tutorial store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a README or walking the workspace tree.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Workspace root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

impl WorkspaceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WorkspaceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the item/user store.
#[cfg(feature = "api")]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database connection lock poisoned")]
    LockPoisoned,
}
