//! Xorcipher Cryptographic Primitives
//!
//! Deterministic building blocks for the xorcipher stream engine. Every
//! function here is pure: no I/O, no clocks, no entropy. Callers supply IVs
//! (and the randomness behind them), which keeps every output reproducible
//! from `(key, iv, input)` alone.
//!
//! # Layers
//!
//! ```text
//! key bytes + IV (16B)
//!        │
//!        ▼
//! Seeder (FNV/Murmur mix) → N × u32 seed words
//!        │
//!        ▼
//! PRNG core: SFC32 | SplitMix32 | Xoshiro128**
//!        │
//!        ▼
//! KeystreamEngine::process → XOR against buffer (4-byte lanes + byte tail)
//! ```
//!
//! Integrity primitives sit beside the keystream:
//!
//! - [`lookup3()`]: Bob Jenkins' public-domain 32-bit hash, used as a
//!   tamper-detection checksum (hash-then-encrypt)
//! - [`Chaskey`]: 128-bit keyed ARX MAC with 12-round permutation, used for
//!   Encrypt-then-MAC
//!
//! # Security
//!
//! The PRNG keystreams are NOT cryptographically secure. SplitMix32 has 32
//! bits of state; SFC32 and Xoshiro128** have 128 bits of largely linear
//! state that an algebraic solver recovers from a short known-plaintext
//! window. These engines provide obfuscation with bit-exact deterministic
//! behavior, nothing stronger.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod chaskey;
pub mod error;
pub mod iv;
pub mod keystream;
pub mod lookup3;
pub mod prng;
pub mod seeder;

pub use chaskey::{Chaskey, ChaskeyHasher, MAC_KEY_SIZE, TAG_SIZE, Tag};
pub use error::PrimitiveError;
pub use iv::{IV_SIZE, Iv};
pub use keystream::{KeystreamEngine, LANE_SIZE, apply_keystream};
pub use lookup3::{CHECKSUM_SIZE, checksum, lookup3};
pub use prng::{Sfc32, SplitMix32, Xoshiro128};
pub use seeder::Seeder;
