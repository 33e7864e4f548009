//! One-shot integrity layers.
//!
//! An [`IntegrityScheme`] wraps a live [`Session`] and produces the part of
//! the envelope that follows the IV:
//!
//! | Mode | Body after `IV(16)` |
//! |---|---|
//! | [`Mode::Plain`] | `Ciphertext(N)` |
//! | [`Mode::Checksum`] | `Enc(Plaintext ‖ Lookup3(Plaintext, 0) as u32 LE)` |
//! | [`Mode::Authenticated`] | `Tag(16) ‖ Ciphertext(N)`, tag = Chaskey over `IV ‖ Ciphertext` |
//!
//! `open` never returns plaintext that failed verification.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use xorcipher_crypto::{CHECKSUM_SIZE, Chaskey, IV_SIZE, KeystreamEngine, TAG_SIZE, checksum};
use zeroize::Zeroize;

use crate::{error::CipherError, session::Session};

/// Integrity layer applied by a one-shot envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Keystream only. Tampering goes undetected.
    #[default]
    Plain,
    /// Hash-then-encrypt with a 4-byte Lookup3 checksum
    Checksum,
    /// Encrypt-then-MAC with a 16-byte Chaskey tag
    Authenticated,
}

impl Mode {
    /// Bytes added on top of the plaintext, excluding the IV.
    pub fn overhead(self) -> usize {
        match self {
            Self::Plain => 0,
            Self::Checksum => CHECKSUM_SIZE,
            Self::Authenticated => TAG_SIZE,
        }
    }

    /// Shortest payload `decrypt` accepts: 16, 20 or 32 bytes.
    pub fn min_payload_len(self) -> usize {
        IV_SIZE + self.overhead()
    }
}

/// Wraps and unwraps the body of a one-shot envelope.
pub trait IntegrityScheme: Send + Sync {
    /// Bytes added on top of the plaintext, excluding the IV.
    fn overhead(&self) -> usize;

    /// Encrypt `plaintext` and attach integrity data.
    fn seal(&self, session: &mut Session, plaintext: &[u8]) -> Vec<u8>;

    /// Verify and decrypt `body`. The caller guarantees
    /// `body.len() >= self.overhead()`.
    fn open(&self, session: &mut Session, body: &[u8]) -> Result<Vec<u8>, CipherError>;
}

/// No integrity layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unauthenticated;

impl IntegrityScheme for Unauthenticated {
    fn overhead(&self) -> usize {
        0
    }

    fn seal(&self, session: &mut Session, plaintext: &[u8]) -> Vec<u8> {
        let mut body = plaintext.to_vec();
        session.process(&mut body);
        body
    }

    fn open(&self, session: &mut Session, body: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut plaintext = body.to_vec();
        session.process(&mut plaintext);
        Ok(plaintext)
    }
}

/// Lookup3 checksum appended before encryption.
///
/// Detects accidental corruption and naive bit flips. It is unkeyed, so it is
/// not a MAC.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookup3Checksum;

impl IntegrityScheme for Lookup3Checksum {
    fn overhead(&self) -> usize {
        CHECKSUM_SIZE
    }

    fn seal(&self, session: &mut Session, plaintext: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(plaintext.len() + CHECKSUM_SIZE);
        body.extend_from_slice(plaintext);
        body.extend_from_slice(&checksum(plaintext));
        session.process(&mut body);
        body
    }

    fn open(&self, session: &mut Session, body: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut plaintext = body.to_vec();
        session.process(&mut plaintext);

        let split = plaintext.len() - CHECKSUM_SIZE;
        let stored = plaintext.split_off(split);
        let expected = checksum(&plaintext);

        if bool::from(expected.as_slice().ct_eq(stored.as_slice())) {
            Ok(plaintext)
        } else {
            plaintext.zeroize();
            Err(CipherError::ChecksumMismatch)
        }
    }
}

/// Chaskey tag over `IV ‖ Ciphertext`, prepended to the ciphertext.
#[derive(Clone)]
pub struct EncryptThenMac {
    mac: Chaskey,
}

impl EncryptThenMac {
    /// Use `mac` for tagging.
    pub fn new(mac: Chaskey) -> Self {
        Self { mac }
    }

    fn tag(&self, session: &Session, ciphertext: &[u8]) -> [u8; TAG_SIZE] {
        let mut hasher = self.mac.hasher();
        hasher.update(session.iv().as_bytes());
        hasher.update(ciphertext);
        hasher.finalize()
    }
}

impl IntegrityScheme for EncryptThenMac {
    fn overhead(&self) -> usize {
        TAG_SIZE
    }

    fn seal(&self, session: &mut Session, plaintext: &[u8]) -> Vec<u8> {
        let mut ciphertext = plaintext.to_vec();
        session.process(&mut ciphertext);

        let mut body = Vec::with_capacity(TAG_SIZE + ciphertext.len());
        body.extend_from_slice(&self.tag(session, &ciphertext));
        body.extend_from_slice(&ciphertext);
        body
    }

    fn open(&self, session: &mut Session, body: &[u8]) -> Result<Vec<u8>, CipherError> {
        let (tag, ciphertext) = body.split_at(TAG_SIZE);
        let expected = self.tag(session, ciphertext);
        if !bool::from(expected.as_slice().ct_eq(tag)) {
            return Err(CipherError::TagMismatch);
        }

        let mut plaintext = ciphertext.to_vec();
        session.process(&mut plaintext);
        Ok(plaintext)
    }
}
