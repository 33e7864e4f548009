//! Error types for primitive construction.
//!
//! Only constructors that accept untyped byte slices can fail. Everything
//! downstream of a successfully built primitive is infallible.

use thiserror::Error;

/// Errors raised when building a primitive from malformed inputs.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveError {
    /// IV is not exactly 16 bytes
    #[error("invalid IV length: expected 16 bytes, got {actual}")]
    InvalidIvLength {
        /// Length that was supplied
        actual: usize,
    },

    /// Chaskey key is not exactly 16 bytes
    #[error("invalid MAC key length: expected 16 bytes, got {actual}")]
    InvalidMacKeyLength {
        /// Length that was supplied
        actual: usize,
    },
}
