use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run.
#[derive(Debug, Error)]
pub enum GraphLogError {
    #[error("failed to open log store {path}: {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read log store: {0}")]
    StoreQuery(#[from] rusqlite::Error),

    #[error("unable to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphLogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GraphLogError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphLogError>;
