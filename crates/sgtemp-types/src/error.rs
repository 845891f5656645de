//! Error types for data parsing in sgtemp-types.

use thiserror::Error;

/// Errors that can occur when parsing reading data.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A timestamp string could not be interpreted.
    #[error("Invalid timestamp '{input}': {reason}")]
    InvalidTimestamp {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp component is out of range.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using sgtemp-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
