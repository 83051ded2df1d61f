use std::path::PathBuf;

/// Errors that can occur while setting up or reading the named pipe.
#[derive(Debug, thiserror::Error)]
pub enum PipeError {
    /// Failed to create the FIFO at the specified path.
    #[error("failed to create pipe at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to open the FIFO for reading.
    #[error("failed to open pipe at {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The path exists but is not a FIFO.
    #[error("existing path is not a named pipe: {path}")]
    NotAPipe { path: PathBuf },

    /// An I/O error occurred on the pipe stream.
    #[error("pipe I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipeError>;
