//! Fuzz target for streaming write boundaries
//!
//! Chunking must be invisible on the wire (HIGH priority)
//!
//! # Strategy
//!
//! - Block sizes: 1 through 255 bytes
//! - Write splits: Arbitrary piece sizes, including single bytes
//! - Integrity: None, chunked checksum, chained MAC, with and without a header
//!
//! # Invariants
//!
//! - Encrypting in pieces produces the same bytes as one write
//! - Decrypting in pieces recovers the plaintext
//! - Feeding arbitrary bytes to a decryptor NEVER panics

#![no_main]

use arbitrary::Arbitrary;
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use xorcipher_core::{Envelope, Iv, IvStrategy, Pipeline, StreamConfig, StreamIntegrity, Variant};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    block_size: u8,
    integrity: IntegrityChoice,
    framed: bool,
    iv: [u8; 16],
    plaintext: Vec<u8>,
    splits: Vec<u8>,
    garbage: Vec<u8>,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum IntegrityChoice {
    None,
    ChunkedChecksum,
    ChainedMac,
}

fn drive(mut pipeline: Pipeline, data: &[u8], splits: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    let mut rest = data;
    let mut sizes = splits.iter().map(|&s| usize::from(s).max(1)).cycle();
    while !rest.is_empty() {
        let size = sizes.next().unwrap_or(rest.len()).min(rest.len());
        let (head, tail) = rest.split_at(size);
        for chunk in pipeline.write_owned(BytesMut::from(head)).ok()? {
            out.extend_from_slice(&chunk);
        }
        rest = tail;
    }
    for chunk in pipeline.finish().ok()? {
        out.extend_from_slice(&chunk);
    }
    Some(out)
}

fuzz_target!(|scenario: Scenario| {
    let integrity = match scenario.integrity {
        IntegrityChoice::None => StreamIntegrity::None,
        IntegrityChoice::ChunkedChecksum => StreamIntegrity::ChunkedChecksum,
        IntegrityChoice::ChainedMac => StreamIntegrity::ChainedMac,
    };
    let Ok(config) = StreamConfig::new(usize::from(scenario.block_size)) else {
        return;
    };
    let config = config.with_framing(scenario.framed);
    let envelope = Envelope::new("fuzz stream key", Variant::Sfc32);
    let iv = IvStrategy::Fixed(Iv::new(scenario.iv));

    let encryptor = || {
        envelope
            .encryptor(integrity, &config, &iv)
            .unwrap_or_else(|err| panic!("valid config rejected: {err}"))
    };
    let decryptor = || {
        envelope
            .decryptor(integrity, &config)
            .unwrap_or_else(|err| panic!("valid config rejected: {err}"))
    };

    let whole = encryptor()
        .process_all(&scenario.plaintext)
        .unwrap_or_else(|err| panic!("encryption failed: {err}"));
    let pieces = drive(encryptor(), &scenario.plaintext, &scenario.splits);
    assert_eq!(pieces.as_deref(), Some(whole.as_slice()), "encryption depends on write splits");

    let plain = drive(decryptor(), &whole, &scenario.splits);
    assert_eq!(plain.as_deref(), Some(scenario.plaintext.as_slice()));

    let _ = drive(decryptor(), &scenario.garbage, &scenario.splits);
});
