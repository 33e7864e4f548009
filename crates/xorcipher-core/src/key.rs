//! Key material.
//!
//! Both key types zeroize on drop and redact themselves in `Debug` output.

use std::fmt;

use xorcipher_crypto::{Chaskey, Iv, KeystreamEngine, MAC_KEY_SIZE};
use zeroize::Zeroize;

use crate::session::{Session, SessionFactory};

/// Arbitrary-length master key. Text keys are taken as their UTF-8 bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey(Vec<u8>);

impl MasterKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty. Empty keys are legal, only weak.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MasterKey {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<String> for MasterKey {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&[u8]> for MasterKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for MasterKey {
    fn from(bytes: &[u8; N]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for MasterKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey(<{} bytes redacted>)", self.0.len())
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// 16-byte Chaskey key derived from the master key.
///
/// Both ends derive it independently, so it never travels on the wire.
pub struct MacKey([u8; MAC_KEY_SIZE]);

impl MacKey {
    /// Run a zero-IV session of `factory` over 16 zero bytes.
    pub fn derive(factory: &SessionFactory, key: &MasterKey) -> Self {
        let mut session = Session::spawn(factory, key.as_bytes(), Iv::ZERO);
        let mut bytes = [0u8; MAC_KEY_SIZE];
        session.process(&mut bytes);
        Self(bytes)
    }

    /// Keyed Chaskey instance.
    pub fn chaskey(&self) -> Chaskey {
        Chaskey::new(&self.0)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for MacKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MacKey(<redacted>)")
    }
}

impl Drop for MacKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
