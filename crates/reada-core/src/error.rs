use std::io;

use thiserror::Error;

/// Canonical result for reada.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stream is not seekable: cannot reposition from {from} to {to}")]
    NotSeekable { from: u64, to: u64 },

    /// The source refused a real seek; the stream was left as it was.
    #[error("seek failed: {0}")]
    Seek(#[source] io::Error),
}

impl Error {
    /// Whether the failed call left the stream untouched, so the same or a
    /// different request can be issued again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_) | Error::NotSeekable { .. } | Error::Seek(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(inner) | Error::Seek(inner) => inner,
            Error::InvalidArgument(msg) | Error::Config(msg) => {
                io::Error::new(io::ErrorKind::InvalidInput, msg)
            }
            e @ Error::NotSeekable { .. } => {
                io::Error::new(io::ErrorKind::Unsupported, e.to_string())
            }
        }
    }
}
