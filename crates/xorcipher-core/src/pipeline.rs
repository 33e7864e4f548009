//! Push-based streaming pipelines.
//!
//! A [`Pipeline`] is an ordered chain of [`Stage`]s driven synchronously by
//! one caller. Each `write` pushes one chunk through every stage in order and
//! returns whatever output became available; `finish` flushes stage by stage
//! so residue from an earlier stage still passes through the later ones.
//!
//! # Compositions
//!
//! ```text
//! integrity        encrypt                              decrypt
//! None             Encrypt                              Decrypt
//! ChunkedChecksum  Injector<Lookup3> → Encrypt          Decrypt → Verifier<Lookup3>
//! ChainedMac       Encrypt → Injector<Chaskey>          Verifier<Chaskey> → Decrypt
//! ```
//!
//! With framing enabled a [`HeaderWriter`] runs last on the encrypt side and
//! a [`HeaderReader`] builds the decrypt chain once the header is parsed.
//!
//! # Failure
//!
//! The first error latches. Every later call returns a clone of it, since
//! trust in every later block depends on the failed one.

use std::fmt;

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use xorcipher_crypto::{Chaskey, Iv};

use crate::{
    chunked::{ChaskeyChain, ChunkInjector, ChunkVerifier, Lookup3Chain},
    cipher_stage::{DecryptStage, EncryptStage},
    config::StreamConfig,
    error::CipherError,
    header::{HeaderReader, HeaderWriter},
    key::MasterKey,
    session::{Session, SessionFactory},
};

/// One transform in a pipeline.
pub trait Stage: Send {
    /// Consume one chunk, appending any output to `out`.
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError>;

    /// End of stream: emit anything still buffered.
    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError>;
}

/// Push `input` through every stage.
pub(crate) fn run_stages(
    stages: &mut [Box<dyn Stage>],
    input: Vec<BytesMut>,
) -> Result<Vec<BytesMut>, CipherError> {
    let mut current = input;
    for stage in stages {
        let mut next = Vec::with_capacity(current.len() * 2);
        for chunk in current {
            stage.transform(chunk, &mut next)?;
        }
        current = next;
    }
    Ok(current)
}

/// Flush each stage after pushing through the output of the one before it.
pub(crate) fn flush_stages(stages: &mut [Box<dyn Stage>]) -> Result<Vec<BytesMut>, CipherError> {
    let mut pending = Vec::new();
    for stage in stages {
        let mut next = Vec::new();
        for chunk in pending {
            stage.transform(chunk, &mut next)?;
        }
        stage.flush(&mut next)?;
        pending = next;
    }
    Ok(pending)
}

/// Integrity layer applied by a streaming pipeline.
///
/// The discriminant is the value written into framed stream headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum StreamIntegrity {
    /// `IV ‖ Ciphertext`
    #[default]
    None = 0,
    /// `IV ‖ Enc(Block ‖ Hash(4) ‖ ...)`, Lookup3 chained by seed
    ChunkedChecksum = 1,
    /// `(IV ‖ Ciphertext)` cut into `Block ‖ Tag(16)`, Chaskey chained by prefix
    ChainedMac = 2,
}

impl StreamIntegrity {
    /// Wire value.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::ChunkedChecksum),
            2 => Some(Self::ChainedMac),
            _ => None,
        }
    }
}

/// Which way a pipeline transforms data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Plaintext in, wire bytes out
    Encrypt,
    /// Wire bytes in, plaintext out
    Decrypt,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encrypt => f.write_str("encrypt"),
            Self::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Everything a pipeline needs to spawn sessions and tag blocks.
#[derive(Clone)]
pub(crate) struct Keying {
    pub(crate) key: MasterKey,
    pub(crate) factory: SessionFactory,
    pub(crate) mac: Chaskey,
}

impl Keying {
    pub(crate) fn encrypt_stages(
        &self,
        integrity: StreamIntegrity,
        block_size: usize,
        iv: Iv,
    ) -> Vec<Box<dyn Stage>> {
        let session = Session::spawn(&self.factory, self.key.as_bytes(), iv);
        let cipher: Box<dyn Stage> = Box::new(EncryptStage::new(session));
        match integrity {
            StreamIntegrity::None => vec![cipher],
            StreamIntegrity::ChunkedChecksum => vec![
                Box::new(ChunkInjector::new(Lookup3Chain, block_size)) as Box<dyn Stage>,
                cipher,
            ],
            StreamIntegrity::ChainedMac => vec![
                cipher,
                Box::new(ChunkInjector::new(ChaskeyChain::new(self.mac.clone()), block_size))
                    as Box<dyn Stage>,
            ],
        }
    }

    pub(crate) fn decrypt_stages(
        &self,
        integrity: StreamIntegrity,
        block_size: usize,
    ) -> Vec<Box<dyn Stage>> {
        let cipher: Box<dyn Stage> =
            Box::new(DecryptStage::new(self.key.clone(), self.factory.clone()));
        match integrity {
            StreamIntegrity::None => vec![cipher],
            StreamIntegrity::ChunkedChecksum => vec![
                cipher,
                Box::new(ChunkVerifier::new(Lookup3Chain, block_size)) as Box<dyn Stage>,
            ],
            StreamIntegrity::ChainedMac => vec![
                Box::new(ChunkVerifier::new(ChaskeyChain::new(self.mac.clone()), block_size))
                    as Box<dyn Stage>,
                cipher,
            ],
        }
    }
}

/// A single-use streaming transform.
///
/// Drive it from one owner, in order. Dropping it without calling
/// [`finish`](Self::finish) abandons the stream; nothing needs flushing.
pub struct Pipeline {
    direction: Direction,
    integrity: StreamIntegrity,
    stages: Vec<Box<dyn Stage>>,
    failure: Option<CipherError>,
    bytes_in: u64,
    bytes_out: u64,
}

impl Pipeline {
    pub(crate) fn encryptor(
        keying: &Keying,
        integrity: StreamIntegrity,
        config: &StreamConfig,
        iv: Iv,
    ) -> Result<Self, CipherError> {
        config.validate()?;
        let mut stages = keying.encrypt_stages(integrity, config.block_size, iv);
        if config.framed {
            stages.push(Box::new(HeaderWriter::new(integrity, config.block_size)));
        }
        Ok(Self::assemble(Direction::Encrypt, integrity, config, stages))
    }

    pub(crate) fn decryptor(
        keying: &Keying,
        integrity: StreamIntegrity,
        config: &StreamConfig,
    ) -> Result<Self, CipherError> {
        config.validate()?;
        let stages = if config.framed {
            vec![Box::new(HeaderReader::new(keying.clone(), integrity)) as Box<dyn Stage>]
        } else {
            keying.decrypt_stages(integrity, config.block_size)
        };
        Ok(Self::assemble(Direction::Decrypt, integrity, config, stages))
    }

    fn assemble(
        direction: Direction,
        integrity: StreamIntegrity,
        config: &StreamConfig,
        stages: Vec<Box<dyn Stage>>,
    ) -> Self {
        tracing::debug!(
            %direction,
            ?integrity,
            block_size = config.block_size,
            framed = config.framed,
            "pipeline built"
        );
        Self { direction, integrity, stages, failure: None, bytes_in: 0, bytes_out: 0 }
    }

    /// Direction of this pipeline.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Integrity layer of this pipeline.
    pub fn integrity(&self) -> StreamIntegrity {
        self.integrity
    }

    /// Push a borrowed chunk.
    pub fn write(&mut self, data: &[u8]) -> Result<Vec<Bytes>, CipherError> {
        self.write_owned(BytesMut::from(data))
    }

    /// Push an owned chunk. Aligned chunks are transformed in place.
    pub fn write_owned(&mut self, chunk: BytesMut) -> Result<Vec<Bytes>, CipherError> {
        self.check_failed()?;
        self.bytes_in += chunk.len() as u64;
        let result = run_stages(&mut self.stages, vec![chunk]);
        self.settle(result)
    }

    /// Flush every stage and end the stream.
    pub fn finish(mut self) -> Result<Vec<Bytes>, CipherError> {
        self.check_failed()?;
        let result = flush_stages(&mut self.stages);
        let output = self.settle(result)?;
        tracing::debug!(
            direction = %self.direction,
            bytes_in = self.bytes_in,
            bytes_out = self.bytes_out,
            "pipeline finished"
        );
        Ok(output)
    }

    /// Transform a complete in-memory stream.
    pub fn process_all(mut self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let mut output = Vec::with_capacity(data.len() + 64);
        for chunk in self.write(data)? {
            output.extend_from_slice(&chunk);
        }
        for chunk in self.finish()? {
            output.extend_from_slice(&chunk);
        }
        Ok(output)
    }

    fn check_failed(&self) -> Result<(), CipherError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn settle(
        &mut self,
        result: Result<Vec<BytesMut>, CipherError>,
    ) -> Result<Vec<Bytes>, CipherError> {
        match result {
            Ok(chunks) => {
                let output: Vec<Bytes> = chunks
                    .into_iter()
                    .filter(|chunk| !chunk.is_empty())
                    .map(BytesMut::freeze)
                    .collect();
                self.bytes_out += output.iter().map(|chunk| chunk.len() as u64).sum::<u64>();
                Ok(output)
            },
            Err(err) => {
                tracing::warn!(
                    direction = %self.direction,
                    integrity = ?self.integrity,
                    bytes_in = self.bytes_in,
                    error = %err,
                    "pipeline failed"
                );
                self.stages.clear();
                self.failure = Some(err.clone());
                Err(err)
            },
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("direction", &self.direction)
            .field("integrity", &self.integrity)
            .field("stages", &self.stages.len())
            .field("failed", &self.failure.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::MacKey, session::Variant};

    fn keying() -> Keying {
        let key = MasterKey::from("pipeline");
        let factory = Variant::Sfc32.factory();
        let mac = MacKey::derive(&factory, &key).chaskey();
        Keying { key, factory, mac }
    }

    const INTEGRITIES: [StreamIntegrity; 3] =
        [StreamIntegrity::None, StreamIntegrity::ChunkedChecksum, StreamIntegrity::ChainedMac];

    #[test]
    fn integrity_wire_values() {
        for integrity in INTEGRITIES {
            assert_eq!(StreamIntegrity::from_u8(integrity.to_u8()), Some(integrity));
        }
        assert_eq!(StreamIntegrity::from_u8(3), None);
    }

    #[test]
    fn roundtrip_every_integrity() {
        let config = StreamConfig::new(10).unwrap();
        let data: Vec<u8> = (0..=255).collect();
        for integrity in INTEGRITIES {
            let iv = Iv::new([1u8; 16]);
            let wire = Pipeline::encryptor(&keying(), integrity, &config, iv)
                .unwrap()
                .process_all(&data)
                .unwrap();
            let plain = Pipeline::decryptor(&keying(), integrity, &config)
                .unwrap()
                .process_all(&wire)
                .unwrap();
            assert_eq!(plain, data, "{integrity:?}");
        }
    }

    #[test]
    fn chained_mac_wire_size() {
        let config = StreamConfig::new(10).unwrap();
        let wire = Pipeline::encryptor(
            &keying(),
            StreamIntegrity::ChainedMac,
            &config,
            Iv::new([1u8; 16]),
        )
        .unwrap()
        .process_all(&[0u8; 25])
        .unwrap();
        // IV + data = 41 bytes → 5 blocks (4 full + 1 byte), each with a 16-byte tag
        assert_eq!(wire.len(), 41 + 5 * 16);
    }

    #[test]
    fn checksum_wire_size() {
        let config = StreamConfig::new(10).unwrap();
        let wire = Pipeline::encryptor(
            &keying(),
            StreamIntegrity::ChunkedChecksum,
            &config,
            Iv::new([1u8; 16]),
        )
        .unwrap()
        .process_all(&[0u8; 25])
        .unwrap();
        // IV + 3 blocks (10, 10, 5), each with a 4-byte hash
        assert_eq!(wire.len(), 16 + 25 + 3 * 4);
    }

    #[test]
    fn failure_latches() {
        let config = StreamConfig::new(8).unwrap();
        let mut wire = Pipeline::encryptor(
            &keying(),
            StreamIntegrity::ChainedMac,
            &config,
            Iv::new([2u8; 16]),
        )
        .unwrap()
        .process_all(&[7u8; 64])
        .unwrap();
        wire[0] ^= 1;

        let mut decryptor =
            Pipeline::decryptor(&keying(), StreamIntegrity::ChainedMac, &config).unwrap();
        let first = decryptor.write(&wire).unwrap_err();
        assert_eq!(first, CipherError::BlockCorrupted { index: 0 });
        assert_eq!(decryptor.write(b"more").unwrap_err(), first);
        assert_eq!(decryptor.finish().unwrap_err(), first);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = StreamConfig { block_size: 0, framed: false };
        assert!(matches!(
            Pipeline::decryptor(&keying(), StreamIntegrity::None, &config),
            Err(CipherError::InvalidBlockSize { .. })
        ));
    }

    #[test]
    fn empty_writes_produce_no_chunks() {
        let config = StreamConfig::default();
        let mut pipeline =
            Pipeline::encryptor(&keying(), StreamIntegrity::None, &config, Iv::ZERO).unwrap();
        let first = pipeline.write(&[]).unwrap();
        assert_eq!(first.len(), 1, "IV only");
        assert!(pipeline.write(&[]).unwrap().is_empty());
        assert!(pipeline.finish().unwrap().is_empty());
    }
}
