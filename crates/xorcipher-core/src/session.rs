//! PRNG variant selection and per-operation sessions.
//!
//! A [`Session`] binds one key and one IV to one live generator for exactly
//! one logical operation. Envelopes and pipelines never hold a session
//! across operations: they keep a [`SessionFactory`] and spawn a fresh one
//! each time, so no two operations share generator state.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use xorcipher_crypto::{Iv, KeystreamEngine, Sfc32, SplitMix32, Xoshiro128};

use crate::error::CipherError;

/// A boxed generator that can move between threads.
pub type BoxedEngine = Box<dyn KeystreamEngine + Send>;

/// Builds a keyed generator from `(key, iv)`.
///
/// Captured once by an envelope; called for every operation.
pub type SessionFactory = Arc<dyn Fn(&[u8], &Iv) -> BoxedEngine + Send + Sync>;

/// PRNG driving the keystream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// SFC32, 128-bit state with 20 warm-up rounds
    #[default]
    Sfc32,
    /// SplitMix32, 32-bit state
    SplitMix32,
    /// Xoshiro128**, 128-bit state
    Xoshiro128,
}

impl Variant {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 3] = [Self::Sfc32, Self::SplitMix32, Self::Xoshiro128];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sfc32 => "sfc32",
            Self::SplitMix32 => "splitmix32",
            Self::Xoshiro128 => "xoshiro128",
        }
    }

    /// Seed a generator of this variant.
    pub fn engine(self, key: &[u8], iv: &Iv) -> BoxedEngine {
        match self {
            Self::Sfc32 => Box::new(Sfc32::new(key, iv)),
            Self::SplitMix32 => Box::new(SplitMix32::new(key, iv)),
            Self::Xoshiro128 => Box::new(Xoshiro128::new(key, iv)),
        }
    }

    /// Factory closure spawning generators of this variant.
    pub fn factory(self) -> SessionFactory {
        Arc::new(move |key: &[u8], iv: &Iv| self.engine(key, iv))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = CipherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| CipherError::UnknownVariant(s.to_owned()))
    }
}

/// One IV-bound generator instance.
pub struct Session {
    iv: Iv,
    engine: BoxedEngine,
}

impl Session {
    /// Spawn a fresh generator for `(key, iv)`.
    pub fn spawn(factory: &SessionFactory, key: &[u8], iv: Iv) -> Self {
        Self { iv, engine: factory(key, &iv) }
    }

    /// IV this session was seeded with.
    pub fn iv(&self) -> &Iv {
        &self.iv
    }
}

impl KeystreamEngine for Session {
    fn next_word(&mut self) -> u32 {
        self.engine.next_word()
    }

    fn process(&mut self, buf: &mut [u8]) {
        self.engine.process(buf);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("iv", &self.iv).finish_non_exhaustive()
    }
}
