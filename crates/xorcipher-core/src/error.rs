//! Error types for the xorcipher core.
//!
//! Three kinds, so callers can tell "fix the call" apart from "reject this
//! input":
//!
//! - Configuration: malformed IVs, keys, block sizes, variants, or a broken
//!   entropy source. Raised before any data is touched.
//! - Truncation: input ended before a header, tag, or IV was complete.
//! - Integrity: a checksum or tag did not match. No plaintext is released.
//!
//! Nothing here is retried internally. A cryptographic mismatch is a property
//! of the data, not of the moment.

use std::io;

use thiserror::Error;
use xorcipher_crypto::PrimitiveError;

/// Coarse classification of a [`CipherError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied invalid parameters
    Configuration,
    /// Input ended before a required field was complete
    Truncation,
    /// Checksum, tag, or header verification failed
    Integrity,
}

/// Errors produced by envelopes, sessions, and stream pipelines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// IV is not exactly 16 bytes
    #[error("invalid IV length: expected 16 bytes, got {actual}")]
    InvalidIvLength {
        /// Length that was supplied
        actual: usize,
    },

    /// MAC key is not exactly 16 bytes
    #[error("invalid MAC key length: expected 16 bytes, got {actual}")]
    InvalidMacKeyLength {
        /// Length that was supplied
        actual: usize,
    },

    /// Block size outside the supported range
    #[error("invalid block size {size}: must be within {min}..={max}")]
    InvalidBlockSize {
        /// Requested block size
        size: usize,
        /// Smallest accepted block size
        min: usize,
        /// Largest accepted block size
        max: usize,
    },

    /// PRNG variant name not recognized
    #[error("unknown cipher variant: {0}")]
    UnknownVariant(String),

    /// Entropy source failed to produce bytes
    #[error("entropy unavailable: {reason}")]
    EntropyUnavailable {
        /// Description from the underlying source
        reason: String,
    },

    /// One-shot payload shorter than its mode's header
    #[error("truncated payload: need at least {expected} bytes, got {actual}")]
    Truncated {
        /// Minimum length for the mode
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Stream ended in the middle of a header, IV, or tag
    #[error("stream truncated: {context}")]
    StreamTruncated {
        /// Which field was incomplete
        context: &'static str,
    },

    /// One-shot checksum did not match the decrypted plaintext
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// One-shot authentication tag did not match
    #[error("authentication tag mismatch")]
    TagMismatch,

    /// A stream block failed chained verification
    #[error("block {index} failed verification")]
    BlockCorrupted {
        /// Zero-based block index within the stream
        index: u64,
    },

    /// Framed stream header is not one this build understands
    #[error("stream header mismatch: {reason}")]
    HeaderMismatch {
        /// Which header field was rejected
        reason: &'static str,
    },

    /// Decrypted bytes are not valid UTF-8
    #[error("decrypted text is not valid UTF-8")]
    InvalidUtf8,
}

impl CipherError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIvLength { .. }
            | Self::InvalidMacKeyLength { .. }
            | Self::InvalidBlockSize { .. }
            | Self::UnknownVariant(_)
            | Self::EntropyUnavailable { .. } => ErrorKind::Configuration,
            Self::Truncated { .. } | Self::StreamTruncated { .. } => ErrorKind::Truncation,
            Self::ChecksumMismatch
            | Self::TagMismatch
            | Self::BlockCorrupted { .. }
            | Self::HeaderMismatch { .. }
            | Self::InvalidUtf8 => ErrorKind::Integrity,
        }
    }

    /// Returns true if this error may succeed on retry.
    ///
    /// Always false: configuration errors need a fixed call, and truncated or
    /// tampered input stays truncated or tampered.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<PrimitiveError> for CipherError {
    fn from(err: PrimitiveError) -> Self {
        match err {
            PrimitiveError::InvalidIvLength { actual } => Self::InvalidIvLength { actual },
            PrimitiveError::InvalidMacKeyLength { actual } => Self::InvalidMacKeyLength { actual },
        }
    }
}

/// Convert `CipherError` to `io::Error` at the `Write` adapter boundary.
impl From<CipherError> for io::Error {
    fn from(err: CipherError) -> Self {
        let kind = match err.kind() {
            ErrorKind::Configuration => io::ErrorKind::InvalidInput,
            ErrorKind::Truncation => io::ErrorKind::UnexpectedEof,
            ErrorKind::Integrity => io::ErrorKind::InvalidData,
        };
        Self::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        assert_eq!(CipherError::InvalidIvLength { actual: 3 }.kind(), ErrorKind::Configuration);
        assert_eq!(
            CipherError::Truncated { expected: 16, actual: 3 }.kind(),
            ErrorKind::Truncation
        );
        assert_eq!(CipherError::BlockCorrupted { index: 4 }.kind(), ErrorKind::Integrity);
        assert_eq!(CipherError::InvalidUtf8.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn nothing_is_retryable() {
        assert!(!CipherError::TagMismatch.is_retryable());
        assert!(!CipherError::StreamTruncated { context: "tag" }.is_retryable());
        assert!(!CipherError::EntropyUnavailable { reason: "x".into() }.is_retryable());
    }

    #[test]
    fn primitive_errors_convert() {
        let err: CipherError = PrimitiveError::InvalidIvLength { actual: 8 }.into();
        assert_eq!(err, CipherError::InvalidIvLength { actual: 8 });
        let err: CipherError = PrimitiveError::InvalidMacKeyLength { actual: 1 }.into();
        assert_eq!(err, CipherError::InvalidMacKeyLength { actual: 1 });
    }

    #[test]
    fn io_error_kinds() {
        let io_err: io::Error = CipherError::InvalidIvLength { actual: 0 }.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
        let io_err: io::Error = CipherError::StreamTruncated { context: "iv" }.into();
        assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
        let io_err: io::Error = CipherError::ChecksumMismatch.into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            CipherError::InvalidBlockSize { size: 0, min: 1, max: 16 }.to_string(),
            "invalid block size 0: must be within 1..=16"
        );
        assert_eq!(
            CipherError::BlockCorrupted { index: 2 }.to_string(),
            "block 2 failed verification"
        );
    }
}
