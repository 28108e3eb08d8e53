//! Error types for common operations

use thiserror::Error;

/// Common result type
pub type Result<T> = std::result::Result<T, CommonError>;

/// Errors raised while decoding shared primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Malformed address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed 32-byte hash
    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    /// Malformed hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),
}

impl From<hex::FromHexError> for CommonError {
    fn from(err: hex::FromHexError) -> Self {
        CommonError::InvalidHex(err.to_string())
    }
}
