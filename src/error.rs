//! Error types for the pacbandit library.

use thiserror::Error;

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, PacError>;

/// Errors that can occur while constructing or running a solver.
#[derive(Error, Debug)]
pub enum PacError {
    /// The arm set passed to `solve` was empty.
    #[error("no arms available")]
    NoArmsAvailable,

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The worker pool for a distributed solver could not be built.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// I/O failure while writing results.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl PacError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PacError::InvalidParameter {
            message: message.into(),
        }
    }
}
