//! One-shot envelope tests
//!
//! Round-trips every mode and variant over the boundary sizes, checks frozen
//! known-answer payloads, and flips every bit of small payloads to confirm
//! tamper detection.

use std::sync::Arc;

use xorcipher_core::{CipherError, Envelope, ErrorKind, Iv, IvStrategy, Mode, SeededEntropy, Variant};

const MODES: [Mode; 3] = [Mode::Plain, Mode::Checksum, Mode::Authenticated];
const SIZES: [usize; 9] = [0, 1, 15, 16, 17, 4095, 4096, 4097, 10 * 4096 + 7];

fn fixed(byte: u8) -> IvStrategy {
    IvStrategy::Fixed(Iv::new([byte; 16]))
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
}

#[test]
fn roundtrip_boundary_sizes() {
    for variant in Variant::ALL {
        let envelope =
            Envelope::new("roundtrip", variant).with_entropy(Arc::new(SeededEntropy::new(1)));
        for mode in MODES {
            for size in SIZES {
                let plaintext = pattern(size);
                let payload = envelope.encrypt(&plaintext, mode).unwrap();
                assert_eq!(payload.len(), 16 + size + mode.overhead());
                assert_eq!(
                    envelope.decrypt(&payload, mode).unwrap(),
                    plaintext,
                    "{variant} {mode:?} size {size}"
                );
            }
        }
    }
}

#[test]
fn scenario_empty_plain_payload() {
    let envelope = Envelope::new(&[0x01u8; 16], Variant::Sfc32);
    let payload = envelope.encrypt_with_iv(b"", Mode::Plain, &fixed(0x02)).unwrap();
    assert_eq!(payload.len(), 16);
    assert_eq!(&payload[..], &[0x02u8; 16]);
}

#[test]
fn known_payloads() {
    let cases = [
        (Variant::Sfc32, Mode::Plain, "4a26a4375d676e7605aaa30bfb65941e153738"),
        (Variant::Sfc32, Mode::Checksum, "4a26a4375d676e7605aaa30bfb65941e1537382b73f49d"),
        (
            Variant::Sfc32,
            Mode::Authenticated,
            "deaba371c241672f7e616a8b0da4ede44a26a4375d676e7605aaa30bfb65941e153738",
        ),
        (Variant::SplitMix32, Mode::Plain, "47cafa8a2ca85703fffc792db103ec4d4122ca"),
        (Variant::SplitMix32, Mode::Checksum, "47cafa8a2ca85703fffc792db103ec4d4122ca12ea7eb8"),
        (
            Variant::SplitMix32,
            Mode::Authenticated,
            "682732135c5210ef06f54fe0148b1af847cafa8a2ca85703fffc792db103ec4d4122ca",
        ),
        (Variant::Xoshiro128, Mode::Plain, "f92a4d076f9aae4e12f785ea88cbe2a4ae1e70"),
        (Variant::Xoshiro128, Mode::Checksum, "f92a4d076f9aae4e12f785ea88cbe2a4ae1e70fce17f33"),
        (
            Variant::Xoshiro128,
            Mode::Authenticated,
            "94e81d0ac08915c6f3b01fd6f47fb0dcf92a4d076f9aae4e12f785ea88cbe2a4ae1e70",
        ),
    ];

    for (variant, mode, body) in cases {
        let envelope = Envelope::new(&[0x01u8; 16], variant);
        let payload = envelope.encrypt_with_iv("The quick brown fox", mode, &fixed(0x02)).unwrap();
        assert_eq!(&payload[..16], &[0x02u8; 16]);
        assert_eq!(hex::encode(&payload[16..]), body, "{variant} {mode:?}");
        assert_eq!(envelope.decrypt_text(&payload, mode).unwrap(), "The quick brown fox");
    }
}

#[test]
fn every_bit_flip_is_detected() {
    for variant in Variant::ALL {
        let envelope = Envelope::new("tamper", variant);
        for mode in [Mode::Checksum, Mode::Authenticated] {
            let payload = envelope.encrypt_with_iv(pattern(23), mode, &fixed(0x05)).unwrap();
            for bit in 0..payload.len() * 8 {
                let mut tampered = payload.clone();
                tampered[bit / 8] ^= 1 << (bit % 8);
                let err = envelope.decrypt(&tampered, mode).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Integrity, "{variant} {mode:?} bit {bit}");
            }
        }
    }
}

#[test]
fn plain_mode_never_rejects() {
    let envelope = Envelope::new("plain", Variant::Sfc32);
    let payload = envelope.encrypt_with_iv(b"hello world", Mode::Plain, &fixed(0x01)).unwrap();
    let mut tampered = payload.clone();
    tampered[16 + 7] ^= 0x20;
    let plaintext = envelope.decrypt(&tampered, Mode::Plain).unwrap();
    assert_eq!(plaintext, b"hello wOrld");
}

#[test]
fn checksum_flip_in_iv_is_detected() {
    let envelope = Envelope::new("iv", Variant::Xoshiro128);
    let mut payload = envelope.encrypt_with_iv(b"abc", Mode::Checksum, &fixed(0x07)).unwrap();
    payload[0] ^= 1;
    assert_eq!(envelope.decrypt(&payload, Mode::Checksum), Err(CipherError::ChecksumMismatch));
}

#[test]
fn ivs_are_fresh_across_calls() {
    let envelope = Envelope::new("fresh", Variant::Sfc32);
    let payloads: Vec<Vec<u8>> =
        (0..8).map(|_| envelope.encrypt(b"same input", Mode::Authenticated).unwrap()).collect();
    for (i, a) in payloads.iter().enumerate() {
        for b in &payloads[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn seeded_entropy_is_reproducible_across_envelopes() {
    let make = || Envelope::new("seed", Variant::Sfc32).with_entropy(Arc::new(SeededEntropy::new(77)));
    assert_eq!(
        make().encrypt("x", Mode::Checksum).unwrap(),
        make().encrypt("x", Mode::Checksum).unwrap()
    );
}

#[test]
fn errors_distinguish_call_from_data() {
    let envelope = Envelope::new("kinds", Variant::Sfc32);
    let bad_iv = IvStrategy::Generator(Arc::new(|| vec![1u8; 17]));
    assert_eq!(
        envelope.encrypt_with_iv("x", Mode::Plain, &bad_iv).unwrap_err().kind(),
        ErrorKind::Configuration
    );
    assert_eq!(
        envelope.decrypt([0u8; 31], Mode::Authenticated).unwrap_err().kind(),
        ErrorKind::Truncation
    );
}
