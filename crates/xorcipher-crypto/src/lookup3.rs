//! Bob Jenkins' lookup3 `hashlittle`, 32-bit output.
//!
//! Used as a 4-byte tamper-detection checksum, never as a MAC: it is unkeyed
//! and linear enough to forge. The chunked stream format feeds the previous
//! block's hash back in as `seed` to chain blocks together.

/// Size of a serialized checksum.
pub const CHECKSUM_SIZE: usize = 4;

const INIT: u32 = 0xdeadbeef;

/// Hash `data` with `seed` (`initval` in the reference code).
pub fn lookup3(data: &[u8], seed: u32) -> u32 {
    let init = INIT.wrapping_add(data.len() as u32).wrapping_add(seed);
    let (mut a, mut b, mut c) = (init, init, init);

    let mut rest = data;
    while rest.len() > 12 {
        let (block, next) = rest.split_at(12);
        a = a.wrapping_add(read_le(&block[0..4]));
        b = b.wrapping_add(read_le(&block[4..8]));
        c = c.wrapping_add(read_le(&block[8..12]));
        mix(&mut a, &mut b, &mut c);
        rest = next;
    }

    if rest.is_empty() {
        return c;
    }

    let mut block = [0u8; 12];
    block[..rest.len()].copy_from_slice(rest);
    a = a.wrapping_add(read_le(&block[0..4]));
    b = b.wrapping_add(read_le(&block[4..8]));
    c = c.wrapping_add(read_le(&block[8..12]));
    final_mix(&mut a, &mut b, &mut c);
    c
}

/// Seed-0 hash of `data` as little-endian bytes.
pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    lookup3(data, 0).to_le_bytes()
}

fn read_le(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(bytes);
    u32::from_le_bytes(word)
}

#[inline]
fn mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(4);
    *c = c.wrapping_add(*b);

    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(6);
    *a = a.wrapping_add(*c);

    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(8);
    *b = b.wrapping_add(*a);

    *a = a.wrapping_sub(*c);
    *a ^= c.rotate_left(16);
    *c = c.wrapping_add(*b);

    *b = b.wrapping_sub(*a);
    *b ^= a.rotate_left(19);
    *a = a.wrapping_add(*c);

    *c = c.wrapping_sub(*b);
    *c ^= b.rotate_left(4);
    *b = b.wrapping_add(*a);
}

#[inline]
fn final_mix(a: &mut u32, b: &mut u32, c: &mut u32) {
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(14));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(11));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(25));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(16));
    *a ^= *c;
    *a = a.wrapping_sub(c.rotate_left(4));
    *b ^= *a;
    *b = b.wrapping_sub(a.rotate_left(14));
    *c ^= *b;
    *c = c.wrapping_sub(b.rotate_left(24));
}
