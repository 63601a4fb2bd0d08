//! Error types for the binding runtime

use thiserror::Error;

/// Result type alias for runtime operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Error type for callback dispatch and wire conversions
#[derive(Error, Debug)]
pub enum RegistryError {
    /// No callback is registered under the handle
    #[error("callback handle {0} is not registered")]
    UnknownHandle(u64),

    /// A JSON payload could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A string crossing the boundary is null, not UTF-8 or contains NUL
    #[error("invalid string: {0}")]
    InvalidString(String),

    /// A byte buffer longer than its 32-bit wire length can describe
    #[error("byte buffer of {0} bytes does not fit the wire length")]
    BufferTooLarge(usize),
}
