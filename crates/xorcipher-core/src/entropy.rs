//! Entropy sources and IV selection.
//!
//! The core never reaches for a global RNG. Every envelope holds an injected
//! [`EntropySource`]: the OS CSPRNG in production, a seeded ChaCha20 stream
//! in tests and simulations where runs must be reproducible.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use xorcipher_crypto::{IV_SIZE, Iv};

use crate::error::CipherError;

/// Source of fresh random bytes for IVs and seeds.
///
/// # Invariants
///
/// - Production implementations MUST be cryptographically secure. IV reuse
///   under one key reuses the keystream.
/// - Given the same seed, deterministic implementations produce the same
///   sequence of bytes.
pub trait EntropySource: Send + Sync {
    /// Fill `buf` with random bytes.
    fn fill(&self, buf: &mut [u8]) -> Result<(), CipherError>;

    /// Draw a fresh 16-byte IV.
    fn iv(&self) -> Result<Iv, CipherError> {
        let mut bytes = [0u8; IV_SIZE];
        self.fill(&mut bytes)?;
        Ok(Iv::new(bytes))
    }

    /// Draw a random 32-bit seed.
    fn seed32(&self) -> Result<u32, CipherError> {
        let mut bytes = [0u8; 4];
        self.fill(&mut bytes)?;
        Ok(u32::from_le_bytes(bytes))
    }
}

/// OS cryptographic RNG via `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEntropy;

impl EntropySource for SystemEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CipherError> {
        getrandom::fill(buf)
            .map_err(|err| CipherError::EntropyUnavailable { reason: err.to_string() })
    }
}

/// Reproducible ChaCha20 stream from a 64-bit seed.
///
/// # Security
///
/// Anyone who knows the seed knows every IV. Use only for tests and
/// simulations.
pub struct SeededEntropy {
    rng: Mutex<ChaCha20Rng>,
}

impl SeededEntropy {
    /// Seed the stream.
    pub fn new(seed: u64) -> Self {
        Self { rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)) }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CipherError> {
        // A panic mid-fill leaves the RNG in a valid state, so poisoning is ignored
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.fill_bytes(buf);
        Ok(())
    }
}

impl fmt::Debug for SeededEntropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededEntropy").finish_non_exhaustive()
    }
}

/// Caller-supplied IV generator. Output is validated to 16 bytes.
pub type IvGenerator = Arc<dyn Fn() -> Vec<u8> + Send + Sync>;

/// How a stream or explicit-IV encryption obtains its IV.
#[derive(Clone, Default)]
pub enum IvStrategy {
    /// Draw from the envelope's entropy source
    #[default]
    Random,
    /// Use this exact IV
    Fixed(Iv),
    /// Call the generator once per stream
    Generator(IvGenerator),
}

impl IvStrategy {
    /// Produce the IV for one session.
    pub fn resolve(&self, entropy: &dyn EntropySource) -> Result<Iv, CipherError> {
        match self {
            Self::Random => entropy.iv(),
            Self::Fixed(iv) => Ok(*iv),
            Self::Generator(generate) => Ok(Iv::try_from(generate().as_slice())?),
        }
    }
}

impl From<Iv> for IvStrategy {
    fn from(iv: Iv) -> Self {
        Self::Fixed(iv)
    }
}

impl fmt::Debug for IvStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("Random"),
            Self::Fixed(iv) => f.debug_tuple("Fixed").field(iv).finish(),
            Self::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}
