//! Error type shared by the hash table and the short link service.

use thiserror::Error;

/// Errors raised at the public call boundary.
///
/// Lookups never fail: a missing key or code is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A required argument was empty, zero, or otherwise out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Code generation hit its attempt bound without finding a free code.
    #[error("short code space exhausted after {attempts} attempts")]
    ExhaustedKeySpace {
        /// Number of candidate codes drawn before giving up
        attempts: usize,
    },
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
