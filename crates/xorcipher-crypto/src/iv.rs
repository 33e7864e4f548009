//! Initialization vector type.

use std::fmt;

use crate::error::PrimitiveError;

/// Size of every IV in bytes.
pub const IV_SIZE: usize = 16;

/// A 16-byte initialization vector.
///
/// The length is enforced by the type: the only fallible constructor is
/// [`TryFrom<&[u8]>`](#impl-TryFrom%3C%26%5Bu8%5D%3E-for-Iv), which rejects
/// anything that is not exactly [`IV_SIZE`] bytes. There is no padding or
/// truncation of short/long inputs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Iv([u8; IV_SIZE]);

impl Iv {
    /// All-zero IV, used for key derivation only.
    pub const ZERO: Self = Self([0u8; IV_SIZE]);

    /// Wrap 16 raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw IV bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; IV_SIZE] {
        &self.0
    }

    /// Consume into raw bytes.
    #[must_use]
    pub fn into_bytes(self) -> [u8; IV_SIZE] {
        self.0
    }
}

impl From<[u8; IV_SIZE]> for Iv {
    fn from(bytes: [u8; IV_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Iv {
    type Error = PrimitiveError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; IV_SIZE] = bytes
            .try_into()
            .map_err(|_| PrimitiveError::InvalidIvLength { actual: bytes.len() })?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Iv {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Iv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Iv(")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        f.write_str(")")
    }
}
