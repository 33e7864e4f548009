//! One-shot encryption and stream construction.
//!
//! An [`Envelope`] stores a master key and a [`SessionFactory`]. Every call
//! spawns a brand-new session from them, so keystream state never outlives
//! one message or one stream.
//!
//! ```text
//! encrypt:  IvStrategy / entropy ──► IV
//!           factory(key, IV) ──► Session ──► IntegrityScheme::seal ──► IV ‖ body
//!
//! decrypt:  IV ‖ body ──► length check ──► factory(key, IV) ──► IntegrityScheme::open
//! ```

use std::{fmt, sync::Arc};

use xorcipher_crypto::{IV_SIZE, Iv};

use crate::{
    config::StreamConfig,
    entropy::{EntropySource, IvStrategy, SystemEntropy},
    error::CipherError,
    key::{MacKey, MasterKey},
    pipeline::{Keying, Pipeline, StreamIntegrity},
    scheme::{EncryptThenMac, IntegrityScheme, Lookup3Checksum, Mode, Unauthenticated},
    session::{Session, SessionFactory, Variant},
};

/// Keyed entry point for one-shot messages and streams.
pub struct Envelope {
    keying: Keying,
    label: &'static str,
    etm: EncryptThenMac,
    entropy: Arc<dyn EntropySource>,
}

impl Envelope {
    /// Envelope using a built-in PRNG variant and OS entropy.
    pub fn new(key: impl Into<MasterKey>, variant: Variant) -> Self {
        Self::build(key.into(), variant.factory(), variant.name())
    }

    /// Envelope using a caller-supplied generator factory.
    ///
    /// The MAC key is derived through the same factory, so both ends must
    /// agree on it.
    pub fn with_factory(key: impl Into<MasterKey>, factory: SessionFactory) -> Self {
        Self::build(key.into(), factory, "custom")
    }

    fn build(key: MasterKey, factory: SessionFactory, label: &'static str) -> Self {
        let mac = MacKey::derive(&factory, &key).chaskey();
        Self {
            etm: EncryptThenMac::new(mac.clone()),
            keying: Keying { key, factory, mac },
            label,
            entropy: Arc::new(SystemEntropy),
        }
    }

    /// Replace the entropy source used for fresh IVs.
    #[must_use]
    pub fn with_entropy(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.entropy = entropy;
        self
    }

    /// Encrypt under a fresh IV drawn from the entropy source.
    pub fn encrypt(&self, plaintext: impl AsRef<[u8]>, mode: Mode) -> Result<Vec<u8>, CipherError> {
        let iv = self.entropy.iv()?;
        Ok(self.seal(iv, plaintext.as_ref(), mode))
    }

    /// Encrypt with an IV chosen by `strategy`.
    ///
    /// Reusing a fixed IV under one key reuses the keystream. That is only
    /// safe for deterministic test vectors.
    pub fn encrypt_with_iv(
        &self,
        plaintext: impl AsRef<[u8]>,
        mode: Mode,
        strategy: &IvStrategy,
    ) -> Result<Vec<u8>, CipherError> {
        let iv = strategy.resolve(self.entropy.as_ref())?;
        Ok(self.seal(iv, plaintext.as_ref(), mode))
    }

    /// Verify and decrypt `IV ‖ body`.
    pub fn decrypt(&self, payload: impl AsRef<[u8]>, mode: Mode) -> Result<Vec<u8>, CipherError> {
        let payload = payload.as_ref();
        let min = mode.min_payload_len();
        if payload.len() < min {
            tracing::warn!(?mode, expected = min, actual = payload.len(), "payload truncated");
            return Err(CipherError::Truncated { expected: min, actual: payload.len() });
        }

        let (iv, body) = payload.split_at(IV_SIZE);
        let iv = Iv::try_from(iv)?;
        let mut session = self.spawn(iv, mode);
        self.scheme(mode).open(&mut session, body).inspect_err(|err| {
            tracing::warn!(?mode, len = payload.len(), error = %err, "payload rejected");
        })
    }

    /// Decrypt and interpret the plaintext as UTF-8.
    pub fn decrypt_text(
        &self,
        payload: impl AsRef<[u8]>,
        mode: Mode,
    ) -> Result<String, CipherError> {
        let plaintext = self.decrypt(payload, mode)?;
        String::from_utf8(plaintext).map_err(|_| CipherError::InvalidUtf8)
    }

    /// Streaming encryptor. The IV is resolved once, up front.
    pub fn encryptor(
        &self,
        integrity: StreamIntegrity,
        config: &StreamConfig,
        strategy: &IvStrategy,
    ) -> Result<Pipeline, CipherError> {
        let iv = strategy.resolve(self.entropy.as_ref())?;
        tracing::debug!(variant = self.label, ?integrity, "spawning stream session");
        Pipeline::encryptor(&self.keying, integrity, config, iv)
    }

    /// Streaming decryptor. The IV is read from the stream.
    pub fn decryptor(
        &self,
        integrity: StreamIntegrity,
        config: &StreamConfig,
    ) -> Result<Pipeline, CipherError> {
        Pipeline::decryptor(&self.keying, integrity, config)
    }

    fn spawn(&self, iv: Iv, mode: Mode) -> Session {
        tracing::debug!(variant = self.label, ?mode, "spawning session");
        Session::spawn(&self.keying.factory, self.keying.key.as_bytes(), iv)
    }

    fn seal(&self, iv: Iv, plaintext: &[u8], mode: Mode) -> Vec<u8> {
        let mut session = self.spawn(iv, mode);
        let body = self.scheme(mode).seal(&mut session, plaintext);

        let mut payload = Vec::with_capacity(IV_SIZE + body.len());
        payload.extend_from_slice(iv.as_bytes());
        payload.extend_from_slice(&body);
        payload
    }

    fn scheme(&self, mode: Mode) -> &dyn IntegrityScheme {
        match mode {
            Mode::Plain => &Unauthenticated,
            Mode::Checksum => &Lookup3Checksum,
            Mode::Authenticated => &self.etm,
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("variant", &self.label)
            .field("key", &self.keying.key)
            .finish_non_exhaustive()
    }
}
