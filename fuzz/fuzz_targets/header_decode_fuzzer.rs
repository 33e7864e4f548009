//! Fuzz target for stream header parsing
//!
//! # Strategy
//!
//! - Magic: Valid, off-by-one, random
//! - Version, integrity, reserved: Valid or random
//! - Block size: Zero, in range, just over max, u32::MAX
//!
//! # Invariants
//!
//! - Parsing NEVER panics
//! - Any header that parses re-encodes to the same bytes
//! - Inputs shorter than the header return `StreamTruncated`

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xorcipher_core::{CipherError, StreamHeader, config::MAX_BLOCK_SIZE};

#[derive(Debug, Clone, Arbitrary)]
struct HeaderBytes {
    magic: Option<[u8; 4]>,
    version: Option<u8>,
    integrity: u8,
    reserved: Option<[u8; 2]>,
    block_size: BlockSize,
    trailing: Vec<u8>,
    cut: Option<u8>,
}

#[derive(Debug, Clone, Arbitrary)]
enum BlockSize {
    Zero,
    InRange(u16),
    JustOverMax,
    MaxU32,
}

fuzz_target!(|input: HeaderBytes| {
    let block_size = match input.block_size {
        BlockSize::Zero => 0,
        BlockSize::InRange(size) => u32::from(size).max(1),
        BlockSize::JustOverMax => MAX_BLOCK_SIZE as u32 + 1,
        BlockSize::MaxU32 => u32::MAX,
    };

    let mut bytes = Vec::with_capacity(StreamHeader::SIZE + input.trailing.len());
    bytes.extend_from_slice(&input.magic.unwrap_or(StreamHeader::MAGIC));
    bytes.push(input.version.unwrap_or(StreamHeader::VERSION));
    bytes.push(input.integrity);
    bytes.extend_from_slice(&input.reserved.unwrap_or([0; 2]));
    bytes.extend_from_slice(&block_size.to_le_bytes());
    bytes.extend_from_slice(&input.trailing);
    if let Some(cut) = input.cut {
        bytes.truncate(usize::from(cut) % (StreamHeader::SIZE + 1));
    }

    match StreamHeader::from_bytes(&bytes) {
        Ok(header) => {
            assert_eq!(header.to_bytes().as_slice(), &bytes[..StreamHeader::SIZE]);
            assert!(header.integrity().is_some());
        },
        Err(err) if bytes.len() < StreamHeader::SIZE => {
            assert!(matches!(err, CipherError::StreamTruncated { .. }));
        },
        Err(err) => assert!(matches!(err, CipherError::HeaderMismatch { .. })),
    }
});
