//! Error types for the hybrid cache

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside a cache tier.
///
/// None of these ever escape a facade-level operation: the facade contains
/// every tier failure and reports it to the caller as absent or a no-op.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error from the local disk tier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be turned into bytes
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Bytes could not be turned back into the requested shape
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Remote backend could not be reached
    #[error("Backend '{backend}' unreachable: {reason}")]
    BackendUnreachable { backend: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Shorthand for [`Error::BackendUnreachable`] with owned fields.
    pub fn unreachable(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::BackendUnreachable {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}
