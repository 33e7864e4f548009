//! Fuzz target for one-shot envelope decryption
//!
//! Hostile payloads must never crash the decryptor (HIGH priority)
//!
//! # Strategy
//!
//! - Raw bytes: Arbitrary payloads in every mode and variant
//! - Mutated: Valid payloads with one byte flipped, truncated, or extended
//!
//! # Invariants
//!
//! - Decryption NEVER panics
//! - Payloads shorter than the mode minimum return `Truncated`
//! - A mutated checksum or authenticated payload is rejected
//! - An untouched payload always round-trips

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use xorcipher_core::{CipherError, Envelope, Iv, IvStrategy, Mode, Variant};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    key: Vec<u8>,
    variant: VariantChoice,
    mode: ModeChoice,
    input: Input,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum VariantChoice {
    Sfc32,
    SplitMix32,
    Xoshiro128,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum ModeChoice {
    Plain,
    Checksum,
    Authenticated,
}

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Flipped { plaintext: Vec<u8>, iv: [u8; 16], position: u16, mask: u8 },
    Truncated { plaintext: Vec<u8>, iv: [u8; 16], cut: u16 },
    Extended { plaintext: Vec<u8>, iv: [u8; 16], extra: Vec<u8> },
}

fuzz_target!(|scenario: Scenario| {
    let variant = match scenario.variant {
        VariantChoice::Sfc32 => Variant::Sfc32,
        VariantChoice::SplitMix32 => Variant::SplitMix32,
        VariantChoice::Xoshiro128 => Variant::Xoshiro128,
    };
    let mode = match scenario.mode {
        ModeChoice::Plain => Mode::Plain,
        ModeChoice::Checksum => Mode::Checksum,
        ModeChoice::Authenticated => Mode::Authenticated,
    };
    let envelope = Envelope::new(scenario.key, variant);
    let seal = |plaintext: &[u8], iv: [u8; 16]| {
        envelope
            .encrypt_with_iv(plaintext, mode, &IvStrategy::Fixed(Iv::new(iv)))
            .unwrap_or_else(|err| panic!("encryption with a fixed IV failed: {err}"))
    };

    match scenario.input {
        Input::Raw(payload) => {
            let result = envelope.decrypt(&payload, mode);
            if payload.len() < mode.min_payload_len() {
                assert!(matches!(result, Err(CipherError::Truncated { .. })));
            }
        },
        Input::Flipped { plaintext, iv, position, mask } => {
            let mut payload = seal(&plaintext, iv);
            let index = usize::from(position) % payload.len();
            let mask = mask.max(1);
            payload[index] ^= mask;

            let result = envelope.decrypt(&payload, mode);
            if mode == Mode::Authenticated {
                assert_eq!(result, Err(CipherError::TagMismatch));
            }
            if mode == Mode::Plain {
                assert!(result.is_ok());
            }
        },
        Input::Truncated { plaintext, iv, cut } => {
            let payload = seal(&plaintext, iv);
            let keep = usize::from(cut) % payload.len();
            let result = envelope.decrypt(&payload[..keep], mode);
            if mode == Mode::Authenticated {
                assert!(result.is_err());
            }
        },
        Input::Extended { plaintext, iv, extra } => {
            let mut payload = seal(&plaintext, iv);
            assert_eq!(envelope.decrypt(&payload, mode).as_deref(), Ok(plaintext.as_slice()));

            payload.extend_from_slice(&extra);
            let result = envelope.decrypt(&payload, mode);
            if mode == Mode::Authenticated && !extra.is_empty() {
                assert!(result.is_err());
            }
        },
    }
});
