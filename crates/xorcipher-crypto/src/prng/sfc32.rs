//! SFC32 (Small Fast Chaotic) generator.

use zeroize::Zeroize;

use crate::{iv::Iv, keystream::KeystreamEngine, seeder::Seeder};

/// Outputs discarded after seeding to diffuse the initial state.
pub const WARMUP_ROUNDS: usize = 20;

/// SFC32 with 4×32-bit state `(a, b, c, d)`, `d` acting as a counter.
pub struct Sfc32 {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
}

impl Sfc32 {
    /// Seed from `key ‖ iv` and run the warm-up rounds.
    pub fn new(key: &[u8], iv: &Iv) -> Self {
        let mut generator = Self::from_words(Seeder::new(key, iv).words::<4>());
        for _ in 0..WARMUP_ROUNDS {
            generator.next_word();
        }
        generator
    }

    /// Build directly from raw state words. No warm-up is applied.
    pub fn from_words([a, b, c, d]: [u32; 4]) -> Self {
        Self { a, b, c, d }
    }
}

impl KeystreamEngine for Sfc32 {
    #[inline]
    fn next_word(&mut self) -> u32 {
        let t = self.a.wrapping_add(self.b);
        self.d = self.d.wrapping_add(1);
        self.a = self.b ^ (self.b >> 9);
        self.b = self.c.wrapping_add(self.c << 3);
        self.c = self.c.rotate_left(21).wrapping_add(t);
        t
    }
}

impl Drop for Sfc32 {
    fn drop(&mut self) {
        self.a.zeroize();
        self.b.zeroize();
        self.c.zeroize();
        self.d.zeroize();
    }
}
