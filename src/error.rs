//! Error handling for the KEM and the attack pipeline.
//!
//! A single error type is shared by every module so attack failures,
//! parameter problems and byte-layout problems all surface the same way.

use thiserror::Error;

/// Errors produced by the cryptosystem and the secret-recovery attacks
#[derive(Debug, Error)]
pub enum LweError {
    /// Caller-supplied message is longer than the fixed message length
    #[error("message too long: {len} bytes, max {max}")]
    MessageTooLong { len: usize, max: usize },

    /// No reduced-basis row matched the expected error-vector signature
    #[error("error vector recovery failed for column {column}: {reason}")]
    ErrorVectorRecoveryFailed { column: usize, reason: String },

    /// The linear system over Z/qZ has no solution
    #[error("inconsistent linear system over Z/qZ")]
    InconsistentLinearSystem,

    /// The ideal basis did not pin down every secret coordinate
    #[error("found {found} linear factors, need {needed}")]
    NoLinearFactorsFound { found: usize, needed: usize },

    /// Parameter set rejected by validation
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Byte layout of a key or ciphertext is malformed
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Lattice reduction did not terminate or overflowed
    #[error("lattice reduction failed: {0}")]
    Reduction(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, LweError>;

/// Create an `LweError::InvalidParameters` with format string support
macro_rules! param_err {
    ($($arg:tt)*) => {
        $crate::error::LweError::InvalidParameters(format!($($arg)*))
    };
}

/// Create an `LweError::Encoding` with format string support
macro_rules! encoding_err {
    ($($arg:tt)*) => {
        $crate::error::LweError::Encoding(format!($($arg)*))
    };
}

pub(crate) use encoding_err;
pub(crate) use param_err;
