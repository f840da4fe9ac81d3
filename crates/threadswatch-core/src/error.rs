use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SwatchError {
    #[error("not initialized: run 'threadswatch init'")]
    NotInitialized,

    #[error("invalid palette data: {0}")]
    Encoding(String),

    #[error("corrupt swatch file: {0}")]
    Corrupt(String),

    #[error("unknown swatch format '{0}': expected 'ase' or 'xml'")]
    UnknownFormat(String),

    #[error("catalog source error: {0}")]
    Source(String),

    #[error("i/o error on {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SwatchError {
    /// Attach `path` to a bare I/O error. Other variants pass through.
    pub fn at_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            SwatchError::Io(source) => SwatchError::Filesystem {
                path: path.into(),
                source,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, SwatchError>;
