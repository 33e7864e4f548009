//! Stream configuration.
//!
//! Block size is the only tunable of the chunked formats. Injector and
//! verifier must agree on it, either out of band or through the framed
//! header (see [`crate::header`]).

use serde::{Deserialize, Serialize};

use crate::error::CipherError;

/// Default block size for chunked streams (64 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

/// Smallest accepted block size.
pub const MIN_BLOCK_SIZE: usize = 1;

/// Largest accepted block size (16 MiB). Bounds verifier buffering.
pub const MAX_BLOCK_SIZE: usize = 16 * 1024 * 1024;

/// Streaming pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Plaintext or ciphertext bytes covered by one chained tag
    pub block_size: usize,
    /// Prefix the stream with a header declaring integrity and block size
    pub framed: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { block_size: DEFAULT_BLOCK_SIZE, framed: false }
    }
}

impl StreamConfig {
    /// Unframed configuration with a validated block size.
    pub fn new(block_size: usize) -> Result<Self, CipherError> {
        let config = Self { block_size, framed: false };
        config.validate()?;
        Ok(config)
    }

    /// Enable or disable the stream header.
    #[must_use]
    pub fn with_framing(mut self, framed: bool) -> Self {
        self.framed = framed;
        self
    }

    /// Check that `block_size` is within range.
    ///
    /// Pipelines call this again on construction, so a deserialized config
    /// cannot bypass it.
    pub fn validate(&self) -> Result<(), CipherError> {
        validate_block_size(self.block_size)
    }
}

pub(crate) fn validate_block_size(size: usize) -> Result<(), CipherError> {
    if (MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(CipherError::InvalidBlockSize { size, min: MIN_BLOCK_SIZE, max: MAX_BLOCK_SIZE })
    }
}
