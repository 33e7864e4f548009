//! Chaskey-12 message authentication code.
//!
//! 128-bit key, 128-bit block, 128-bit tag. The state is four 32-bit words
//! run through an ARX permutation (12 rounds). Subkeys `K1 = 2·K` and
//! `K2 = 4·K` (doubling in GF(2^128), little-endian word order) separate
//! full final blocks from padded ones so no two messages share a final
//! state.
//!
//! # Construction
//!
//! ```text
//! v = k
//! for every block except the last:  v ^= m_i;  v = π(v)
//! last block full (len > 0):        v ^= m_n ^ K1
//! otherwise:                        v ^= (m_n ‖ 0x01 ‖ 0*) ^ K2
//! v = π(v);  tag = v ^ k
//! ```
//!
//! [`ChaskeyHasher`] produces the same tag incrementally. It always holds
//! back the most recent block until [`ChaskeyHasher::finalize`], because a
//! full block is only known to be the last one once no more input arrives.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::PrimitiveError;

/// Chaskey key size in bytes.
pub const MAC_KEY_SIZE: usize = 16;

/// Chaskey tag size in bytes.
pub const TAG_SIZE: usize = 16;

/// Chaskey block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Number of permutation rounds.
pub const ROUNDS: usize = 12;

/// A Chaskey authentication tag.
pub type Tag = [u8; TAG_SIZE];

/// Keyed Chaskey-12 instance with precomputed subkeys.
#[derive(Clone)]
pub struct Chaskey {
    k: [u32; 4],
    k1: [u32; 4],
    k2: [u32; 4],
}

impl Chaskey {
    /// Load a 16-byte key as four little-endian words and derive subkeys.
    pub fn new(key: &[u8; MAC_KEY_SIZE]) -> Self {
        let k = load_block(key);
        let k1 = times_two(k);
        let k2 = times_two(k1);
        Self { k, k1, k2 }
    }

    /// Build from an untyped slice, rejecting anything but 16 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self, PrimitiveError> {
        let key: &[u8; MAC_KEY_SIZE] = key
            .try_into()
            .map_err(|_| PrimitiveError::InvalidMacKeyLength { actual: key.len() })?;
        Ok(Self::new(key))
    }

    /// Tag a complete message.
    pub fn mac(&self, message: &[u8]) -> Tag {
        let mut hasher = self.hasher();
        hasher.update(message);
        hasher.finalize()
    }

    /// Recompute the tag over `message` and compare in constant time.
    ///
    /// A `tag` of the wrong length never verifies.
    pub fn verify(&self, message: &[u8], tag: &[u8]) -> bool {
        let expected = self.mac(message);
        expected.as_slice().ct_eq(tag).into()
    }

    /// Start an incremental computation.
    pub fn hasher(&self) -> ChaskeyHasher {
        ChaskeyHasher {
            key: self.clone(),
            v: self.k,
            pending: [0u8; BLOCK_SIZE],
            pending_len: 0,
        }
    }
}

impl Drop for Chaskey {
    fn drop(&mut self) {
        self.k.zeroize();
        self.k1.zeroize();
        self.k2.zeroize();
    }
}

/// Incremental Chaskey computation.
pub struct ChaskeyHasher {
    key: Chaskey,
    v: [u32; 4],
    pending: [u8; BLOCK_SIZE],
    pending_len: usize,
}

impl ChaskeyHasher {
    /// Absorb more message bytes.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            if self.pending_len == BLOCK_SIZE {
                xor_words(&mut self.v, load_block(&self.pending));
                permute(&mut self.v);
                self.pending_len = 0;
            }
            let take = (BLOCK_SIZE - self.pending_len).min(data.len());
            let (head, rest) = data.split_at(take);
            self.pending[self.pending_len..self.pending_len + take].copy_from_slice(head);
            self.pending_len += take;
            data = rest;
        }
    }

    /// Process the final block and produce the tag.
    pub fn finalize(mut self) -> Tag {
        let mut v = self.v;
        if self.pending_len == BLOCK_SIZE {
            xor_words(&mut v, load_block(&self.pending));
            xor_words(&mut v, self.key.k1);
        } else {
            let mut last = [0u8; BLOCK_SIZE];
            last[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
            last[self.pending_len] = 0x01;
            xor_words(&mut v, load_block(&last));
            xor_words(&mut v, self.key.k2);
            last.zeroize();
        }
        permute(&mut v);
        xor_words(&mut v, self.key.k);

        let mut tag = [0u8; TAG_SIZE];
        for (out, word) in tag.chunks_exact_mut(4).zip(v) {
            out.copy_from_slice(&word.to_le_bytes());
        }
        v.zeroize();
        self.pending.zeroize();
        tag
    }
}

impl Drop for ChaskeyHasher {
    fn drop(&mut self) {
        self.v.zeroize();
        self.pending.zeroize();
    }
}

fn load_block(bytes: &[u8; BLOCK_SIZE]) -> [u32; 4] {
    std::array::from_fn(|i| {
        u32::from_le_bytes([bytes[4 * i], bytes[4 * i + 1], bytes[4 * i + 2], bytes[4 * i + 3]])
    })
}

fn xor_words(v: &mut [u32; 4], words: [u32; 4]) {
    for (lane, word) in v.iter_mut().zip(words) {
        *lane ^= word;
    }
}

/// Multiply by `x` in GF(2^128) modulo `x^128 + x^7 + x^2 + x + 1`.
fn times_two(k: [u32; 4]) -> [u32; 4] {
    let carry = if k[3] >> 31 == 1 { 0x87 } else { 0 };
    [
        (k[0] << 1) ^ carry,
        (k[1] << 1) | (k[0] >> 31),
        (k[2] << 1) | (k[1] >> 31),
        (k[3] << 1) | (k[2] >> 31),
    ]
}

#[inline]
fn permute(v: &mut [u32; 4]) {
    for _ in 0..ROUNDS {
        v[0] = v[0].wrapping_add(v[1]);
        v[1] = v[1].rotate_left(5) ^ v[0];
        v[0] = v[0].rotate_left(16);

        v[2] = v[2].wrapping_add(v[3]);
        v[3] = v[3].rotate_left(8) ^ v[2];

        v[0] = v[0].wrapping_add(v[3]);
        v[3] = v[3].rotate_left(13) ^ v[0];

        v[2] = v[2].wrapping_add(v[1]);
        v[1] = v[1].rotate_left(7) ^ v[2];
        v[2] = v[2].rotate_left(16);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: [u8; 16] = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
        0x0f,
    ];

    #[test]
    fn subkey_doubling_without_carry() {
        assert_eq!(times_two([1, 0, 0, 0]), [2, 0, 0, 0]);
        assert_eq!(times_two([0x80000000, 0, 0, 0]), [0, 1, 0, 0]);
    }

    #[test]
    fn subkey_doubling_with_reduction() {
        let k1 = times_two([0, 0, 0, 0x80000000]);
        assert_eq!(k1, [0x87, 0, 0, 0]);
        assert_eq!(times_two(k1), [0x10e, 0, 0, 0]);
    }

    #[test]
    fn known_tags() {
        let mac = Chaskey::new(&KEY);
        for (len, expected) in KNOWN_TAGS {
            let message: Vec<u8> = (0..len as u8).collect();
            assert_eq!(hex::encode(mac.mac(&message)), expected, "len = {len}");
        }
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mac = Chaskey::new(&KEY);
        let message: Vec<u8> = (0..=99).collect();
        for split in [0, 1, 15, 16, 17, 32, 99, 100] {
            let mut hasher = mac.hasher();
            hasher.update(&message[..split]);
            hasher.update(&message[split..]);
            assert_eq!(hasher.finalize(), mac.mac(&message), "split = {split}");
        }
    }

    #[test]
    fn full_and_padded_final_blocks_differ() {
        let mac = Chaskey::new(&KEY);
        let mut block = [0xAAu8; 16];
        block[15] = 0x01;
        assert_ne!(mac.mac(&block), mac.mac(&block[..15]));
    }

    #[test]
    fn verify_rejects_modified_tag() {
        let mac = Chaskey::new(&KEY);
        let mut tag = mac.mac(b"message");
        assert!(mac.verify(b"message", &tag));
        tag[0] ^= 1;
        assert!(!mac.verify(b"message", &tag));
        assert!(!mac.verify(b"message", &tag[..8]));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(matches!(
            Chaskey::from_slice(&[0u8; 15]),
            Err(PrimitiveError::InvalidMacKeyLength { actual: 15 })
        ));
        assert!(Chaskey::from_slice(&KEY).is_ok());
    }

    const KNOWN_TAGS: [(usize, &str); 6] = [
        (0, "d73ec6fe83596898953112a8045c5c24"),
        (1, "618568a7a50e9c6999e78b2489089218"),
        (15, "b1ee913d0a63ec7fa27f9e1ed4cc394a"),
        (16, "704b93b424430ce34d0f97b26881b55e"),
        (17, "0eb4b4b2d393add7178c47b45f5c4954"),
        (32, "caf92a20af29c0296f424f1b4b9dd9dc"),
    ];
}
