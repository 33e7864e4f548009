//! SplitMix32 generator.

use zeroize::Zeroize;

use crate::{iv::Iv, keystream::KeystreamEngine, seeder::Seeder};

const GAMMA: u32 = 0x9E3779B9;

/// SplitMix32 with a single 32-bit counter state.
///
/// The whole keystream is determined by one word, so an attacker needs at
/// most 2^32 guesses. Kept for its speed and bit-exact reproducibility.
pub struct SplitMix32 {
    state: u32,
}

impl SplitMix32 {
    /// Seed from `key ‖ iv`.
    pub fn new(key: &[u8], iv: &Iv) -> Self {
        Self::from_state(Seeder::new(key, iv).next_word())
    }

    /// Build directly from a raw state word.
    pub fn from_state(state: u32) -> Self {
        Self { state }
    }
}

impl KeystreamEngine for SplitMix32 {
    #[inline]
    fn next_word(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 16)).wrapping_mul(0x85ebca6b);
        z = (z ^ (z >> 13)).wrapping_mul(0xc2b2ae35);
        z ^ (z >> 16)
    }
}

impl Drop for SplitMix32 {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}
