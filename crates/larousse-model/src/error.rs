use std::path::PathBuf;
use thiserror::Error;

/// Why a snapshot run stopped.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("no entry found at {url}; wrote placeholder {}", placeholder.display())]
    NoContent { url: String, placeholder: PathBuf },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("a snapshot is already running")]
    Busy,

    #[error("snapshot worker failed: {0}")]
    Worker(String),
}

impl SnapshotError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.into(),
            source,
        }
    }
}
