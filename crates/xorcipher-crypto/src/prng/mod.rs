//! PRNG cores.
//!
//! Each generator is a pure 32-bit state machine: construction seeds it from
//! `key ‖ iv` via [`Seeder`](crate::Seeder), and every call to
//! [`KeystreamEngine::next_word`](crate::KeystreamEngine::next_word) advances
//! the state and yields exactly one word. All arithmetic wraps modulo 2^32.
//!
//! Generators are intentionally neither `Clone` nor `Debug`: duplicating a
//! live state would reuse keystream, and printing it would leak it.

mod sfc32;
mod splitmix32;
mod xoshiro128;

pub use sfc32::Sfc32;
pub use splitmix32::SplitMix32;
pub use xoshiro128::Xoshiro128;
