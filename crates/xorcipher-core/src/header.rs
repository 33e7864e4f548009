//! Optional stream header declaring integrity and block size.
//!
//! The chunked formats carry no block-size field of their own. A framed
//! stream prefixes them with a fixed 12-byte header so the receiver does not
//! have to know the sender's block size in advance:
//!
//! ```text
//! 0      4        5          6          8              12
//! ┌──────┬────────┬──────────┬──────────┬──────────────┐
//! │ XORS │ ver(1) │ integ(1) │ rsvd(2)  │ block_size   │
//! └──────┴────────┴──────────┴──────────┴──────────────┘
//!                                        u32 LE
//! ```
//!
//! The header is not authenticated on its own. A forged block size changes
//! where tags are expected, so chained verification fails at block 0.

use bytes::BytesMut;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{
    config::validate_block_size,
    error::CipherError,
    pipeline::{Keying, Stage, StreamIntegrity, flush_stages, run_stages},
};

/// Fixed 12-byte stream header.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct StreamHeader {
    magic: [u8; 4],
    version: u8,
    integrity: u8,
    reserved: [u8; 2],
    block_size: [u8; 4],
}

const _: () = assert!(size_of::<StreamHeader>() == StreamHeader::SIZE);

impl StreamHeader {
    /// Serialized size.
    pub const SIZE: usize = 12;

    /// Leading magic bytes.
    pub const MAGIC: [u8; 4] = *b"XORS";

    /// Current header version.
    pub const VERSION: u8 = 1;

    /// Header for a stream with this integrity and block size.
    pub fn new(integrity: StreamIntegrity, block_size: u32) -> Self {
        Self {
            magic: Self::MAGIC,
            version: Self::VERSION,
            integrity: integrity.to_u8(),
            reserved: [0; 2],
            block_size: block_size.to_le_bytes(),
        }
    }

    /// Parse from the front of `bytes`.
    ///
    /// Checks magic, version, reserved bytes and integrity value. The block
    /// size range is left to the caller.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self, CipherError> {
        let (header, _) = Self::ref_from_prefix(bytes)
            .map_err(|_| CipherError::StreamTruncated { context: "stream header" })?;

        if header.magic != Self::MAGIC {
            return Err(CipherError::HeaderMismatch { reason: "bad magic" });
        }
        if header.version != Self::VERSION {
            return Err(CipherError::HeaderMismatch { reason: "unsupported version" });
        }
        if header.reserved != [0; 2] {
            return Err(CipherError::HeaderMismatch { reason: "reserved bytes set" });
        }
        if StreamIntegrity::from_u8(header.integrity).is_none() {
            return Err(CipherError::HeaderMismatch { reason: "unknown integrity" });
        }

        Ok(header)
    }

    /// Serialize.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(IntoBytes::as_bytes(self));
        out
    }

    /// Declared integrity layer. `None` only for unvalidated headers.
    pub fn integrity(&self) -> Option<StreamIntegrity> {
        StreamIntegrity::from_u8(self.integrity)
    }

    /// Declared block size.
    pub fn block_size(&self) -> u32 {
        u32::from_le_bytes(self.block_size)
    }
}

/// Encrypt side: emits the header ahead of the first output byte.
pub(crate) struct HeaderWriter {
    header: Option<StreamHeader>,
}

impl HeaderWriter {
    pub(crate) fn new(integrity: StreamIntegrity, block_size: usize) -> Self {
        // Pipelines validate block_size against MAX_BLOCK_SIZE, which fits in u32
        Self { header: Some(StreamHeader::new(integrity, block_size as u32)) }
    }

    fn emit_header(&mut self, out: &mut Vec<BytesMut>) {
        if let Some(header) = self.header.take() {
            out.push(BytesMut::from(&header.to_bytes()[..]));
        }
    }
}

impl Stage for HeaderWriter {
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        self.emit_header(out);
        out.push(chunk);
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        self.emit_header(out);
        Ok(())
    }
}

/// Decrypt side: parses the header, then builds and drives the inner chain.
pub(crate) struct HeaderReader {
    keying: Keying,
    expected: StreamIntegrity,
    head: BytesMut,
    inner: Option<Vec<Box<dyn Stage>>>,
}

impl HeaderReader {
    pub(crate) fn new(keying: Keying, expected: StreamIntegrity) -> Self {
        Self { keying, expected, head: BytesMut::new(), inner: None }
    }

    fn build_inner(&self) -> Result<Vec<Box<dyn Stage>>, CipherError> {
        let header = StreamHeader::from_bytes(&self.head)?;
        if header.integrity() != Some(self.expected) {
            tracing::warn!(
                expected = ?self.expected,
                declared = header.integrity,
                "stream header integrity mismatch"
            );
            return Err(CipherError::HeaderMismatch { reason: "integrity mismatch" });
        }

        let block_size = header.block_size() as usize;
        validate_block_size(block_size)?;
        tracing::debug!(integrity = ?self.expected, block_size, "stream header accepted");
        Ok(self.keying.decrypt_stages(self.expected, block_size))
    }
}

impl Stage for HeaderReader {
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        let chunk = if self.inner.is_some() {
            chunk
        } else {
            self.head.unsplit(chunk);
            if self.head.len() < StreamHeader::SIZE {
                return Ok(());
            }
            let rest = self.head.split_off(StreamHeader::SIZE);
            self.inner = Some(self.build_inner()?);
            rest
        };

        let Some(inner) = self.inner.as_mut() else {
            unreachable!("invariant: inner chain built once the header is complete")
        };
        out.extend(run_stages(inner, vec![chunk])?);
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        let Some(inner) = self.inner.as_mut() else {
            tracing::warn!(received = self.head.len(), "stream ended inside header");
            return Err(CipherError::StreamTruncated { context: "stream header" });
        };
        out.extend(flush_stages(inner)?);
        Ok(())
    }
}
