//! Error types shared by the codecs.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the codecs and the reporting helpers.
#[derive(Debug, Error)]
pub enum Error {
    /// Decode input cannot correspond to any valid encoder output.
    #[error("malformed stream: {0}")]
    MalformedStream(String),

    /// Caller supplied an invalid option or selector.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File access failed (reporting binary only).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a malformed stream error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedStream(message.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Whether this error reports a corrupt or truncated stream.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedStream(_))
    }
}
