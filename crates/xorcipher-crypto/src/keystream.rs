//! Keystream application.
//!
//! A [`KeystreamEngine`] is any generator of 32-bit words. Encryption and
//! decryption are the same operation: XOR the little-endian encoding of
//! successive words against the buffer.
//!
//! # Lane Paths
//!
//! ```text
//! buffer:  [ lanes (len & !3 bytes) ][ tail (0-3 bytes) ]
//!            │                         │
//!            ├─ 4-byte aligned → &mut [u32], 4-lane unrolled
//!            └─ misaligned    → 4-byte groups via to_le_bytes
//!                                      └─ one word, low bytes only
//! ```
//!
//! Both lane paths consume exactly one word per 4 bytes in the same order,
//! so the keystream never depends on where the allocator put the buffer.

use zerocopy::FromBytes;

/// Bytes covered by one generator word.
pub const LANE_SIZE: usize = 4;

/// A deterministic 32-bit word generator usable as a keystream.
pub trait KeystreamEngine {
    /// Advance the state and return the next word.
    fn next_word(&mut self) -> u32;

    /// XOR the keystream into `buf` in place.
    ///
    /// A trailing partial group consumes one full word; the unused high
    /// bytes of that word are discarded.
    fn process(&mut self, buf: &mut [u8]) {
        apply_keystream(self, buf);
    }

    /// Overwrite `buf` with raw keystream bytes.
    fn fill(&mut self, buf: &mut [u8]) {
        buf.fill(0);
        self.process(buf);
    }
}

/// XOR successive little-endian words from `engine` over `buf`.
pub fn apply_keystream<E: KeystreamEngine + ?Sized>(engine: &mut E, buf: &mut [u8]) {
    let lanes_len = buf.len() & !(LANE_SIZE - 1);
    let (body, tail) = buf.split_at_mut(lanes_len);

    match <[u32]>::mut_from_bytes(body) {
        Ok(lanes) => xor_lanes(engine, lanes),
        Err(_) => xor_byte_groups(engine, body),
    }

    if !tail.is_empty() {
        let word = engine.next_word().to_le_bytes();
        for (byte, key) in tail.iter_mut().zip(word) {
            *byte ^= key;
        }
    }
}

fn xor_lanes<E: KeystreamEngine + ?Sized>(engine: &mut E, lanes: &mut [u32]) {
    let mut quads = lanes.chunks_exact_mut(4);
    for quad in &mut quads {
        quad[0] ^= engine.next_word().to_le();
        quad[1] ^= engine.next_word().to_le();
        quad[2] ^= engine.next_word().to_le();
        quad[3] ^= engine.next_word().to_le();
    }
    for lane in quads.into_remainder() {
        *lane ^= engine.next_word().to_le();
    }
}

fn xor_byte_groups<E: KeystreamEngine + ?Sized>(engine: &mut E, body: &mut [u8]) {
    for group in body.chunks_exact_mut(LANE_SIZE) {
        let word = engine.next_word().to_le_bytes();
        for (byte, key) in group.iter_mut().zip(word) {
            *byte ^= key;
        }
    }
}
