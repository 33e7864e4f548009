//! Chained per-block authentication for unbounded streams.
//!
//! The injector cuts its input into `block_size` blocks and follows each with
//! a tag computed over the block and the previous tag:
//!
//! ```text
//! Block_0 ‖ Tag_0 ‖ Block_1 ‖ Tag_1 ‖ ... ‖ Block_n (≤ block_size) ‖ Tag_n
//!
//! Tag_i = H(Tag_{i-1}, Block_i),  Tag_{-1} = all zeros
//! ```
//!
//! Chaining makes blocks non-reorderable: moving a block changes the tag it
//! must carry. The verifier mirrors the injector and aborts at the first
//! mismatch.
//!
//! A stream cut exactly at a block boundary still verifies. Detecting that
//! needs an end-of-stream marker the wire format does not have.

use bytes::BytesMut;
use subtle::ConstantTimeEq;
use xorcipher_crypto::{CHECKSUM_SIZE, Chaskey, TAG_SIZE, lookup3};

use crate::{error::CipherError, pipeline::Stage};

/// Tag function for one chained block.
pub trait BlockAuthenticator: Send {
    /// Serialized tag type.
    type Tag: AsRef<[u8]> + Copy + Send;

    /// Serialized tag length.
    const TAG_SIZE: usize;

    /// Tag preceding the first block.
    fn initial_tag(&self) -> Self::Tag;

    /// Tag for `block`, chained to `prev`.
    fn tag(&self, prev: &Self::Tag, block: &[u8]) -> Self::Tag;
}

/// Lookup3 seeded with the previous hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lookup3Chain;

impl BlockAuthenticator for Lookup3Chain {
    type Tag = [u8; CHECKSUM_SIZE];

    const TAG_SIZE: usize = CHECKSUM_SIZE;

    fn initial_tag(&self) -> Self::Tag {
        [0u8; CHECKSUM_SIZE]
    }

    fn tag(&self, prev: &Self::Tag, block: &[u8]) -> Self::Tag {
        lookup3(block, u32::from_le_bytes(*prev)).to_le_bytes()
    }
}

/// Chaskey over `prev ‖ block`.
#[derive(Clone)]
pub struct ChaskeyChain {
    mac: Chaskey,
}

impl ChaskeyChain {
    /// Chain tags with `mac`.
    pub fn new(mac: Chaskey) -> Self {
        Self { mac }
    }
}

impl BlockAuthenticator for ChaskeyChain {
    type Tag = [u8; TAG_SIZE];

    const TAG_SIZE: usize = TAG_SIZE;

    fn initial_tag(&self) -> Self::Tag {
        [0u8; TAG_SIZE]
    }

    fn tag(&self, prev: &Self::Tag, block: &[u8]) -> Self::Tag {
        let mut hasher = self.mac.hasher();
        hasher.update(prev);
        hasher.update(block);
        hasher.finalize()
    }
}

/// Encrypt side: emits `block ‖ tag` pairs.
pub struct ChunkInjector<A: BlockAuthenticator> {
    auth: A,
    block_size: usize,
    buffer: BytesMut,
    prev: A::Tag,
    index: u64,
}

impl<A: BlockAuthenticator> ChunkInjector<A> {
    /// Cut input into `block_size` blocks. The caller validates the size.
    pub fn new(auth: A, block_size: usize) -> Self {
        let prev = auth.initial_tag();
        Self { auth, block_size, buffer: BytesMut::new(), prev, index: 0 }
    }

    /// Blocks emitted so far.
    pub fn blocks(&self) -> u64 {
        self.index
    }

    fn seal(&mut self, block: BytesMut, out: &mut Vec<BytesMut>) {
        let tag = self.auth.tag(&self.prev, &block);
        tracing::trace!(index = self.index, len = block.len(), "sealed block");
        self.prev = tag;
        self.index += 1;
        out.push(block);
        out.push(BytesMut::from(tag.as_ref()));
    }
}

impl<A: BlockAuthenticator> Stage for ChunkInjector<A> {
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        self.buffer.unsplit(chunk);
        while self.buffer.len() >= self.block_size {
            let block = self.buffer.split_to(self.block_size);
            self.seal(block, out);
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        if !self.buffer.is_empty() {
            let block = self.buffer.split();
            self.seal(block, out);
        }
        Ok(())
    }
}

/// Decrypt side: checks and strips tags, emitting verified blocks only.
pub struct ChunkVerifier<A: BlockAuthenticator> {
    auth: A,
    block_size: usize,
    buffer: BytesMut,
    prev: A::Tag,
    index: u64,
}

impl<A: BlockAuthenticator> ChunkVerifier<A> {
    /// Expect `block_size` blocks. The caller validates the size.
    pub fn new(auth: A, block_size: usize) -> Self {
        let prev = auth.initial_tag();
        Self { auth, block_size, buffer: BytesMut::new(), prev, index: 0 }
    }

    /// Blocks verified so far.
    pub fn blocks(&self) -> u64 {
        self.index
    }

    fn check(
        &mut self,
        block: BytesMut,
        tag: &[u8],
        out: &mut Vec<BytesMut>,
    ) -> Result<(), CipherError> {
        let expected = self.auth.tag(&self.prev, &block);
        if !bool::from(expected.as_ref().ct_eq(tag)) {
            tracing::warn!(index = self.index, len = block.len(), "block failed verification");
            return Err(CipherError::BlockCorrupted { index: self.index });
        }

        tracing::trace!(index = self.index, len = block.len(), "verified block");
        self.prev = expected;
        self.index += 1;
        out.push(block);
        Ok(())
    }
}

impl<A: BlockAuthenticator> Stage for ChunkVerifier<A> {
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        self.buffer.unsplit(chunk);
        let frame = self.block_size + A::TAG_SIZE;
        while self.buffer.len() >= frame {
            let mut block = self.buffer.split_to(frame);
            let tag = block.split_off(self.block_size);
            self.check(block, &tag, out)?;
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        if self.buffer.len() < A::TAG_SIZE {
            tracing::warn!(index = self.index, len = self.buffer.len(), "stream ended inside tag");
            return Err(CipherError::StreamTruncated { context: "final block tag" });
        }

        let mut block = self.buffer.split();
        let tag = block.split_off(block.len() - A::TAG_SIZE);
        self.check(block, &tag, out)
    }
}
