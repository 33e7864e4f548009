//! Keystream stages for streaming pipelines.
//!
//! Writes arrive with arbitrary boundaries, but the keystream advances one
//! word per 4 bytes and a partial group burns a whole word. The
//! [`LaneAligner`] therefore only releases 4-byte-aligned runs and carries
//! the 0-3 leftover bytes into the next write; the carry is processed
//! through the byte-wise tail path at flush.
//!
//! ```text
//! write:   [ carry | chunk ..................... ]
//!          └───────── aligned prefix ──────────┘└ new carry (0-3) ┘
//! ```

use bytes::BytesMut;
use xorcipher_crypto::{IV_SIZE, Iv, KeystreamEngine, LANE_SIZE};

use crate::{
    error::CipherError,
    key::MasterKey,
    pipeline::Stage,
    session::{Session, SessionFactory},
};

/// Realigns arbitrary chunks onto 4-byte lane boundaries.
#[derive(Debug, Default)]
pub struct LaneAligner {
    carry: BytesMut,
}

impl LaneAligner {
    /// Return the aligned bytes now available, if any.
    ///
    /// Zero-copy when there is no carry and `chunk` is already aligned.
    pub fn align(&mut self, chunk: BytesMut) -> Option<BytesMut> {
        if self.carry.is_empty() && chunk.len() % LANE_SIZE == 0 {
            return (!chunk.is_empty()).then_some(chunk);
        }

        let mut combined = BytesMut::with_capacity(self.carry.len() + chunk.len());
        combined.extend_from_slice(&self.carry);
        combined.extend_from_slice(&chunk);

        let aligned = combined.len() & !(LANE_SIZE - 1);
        self.carry = BytesMut::from(&combined[aligned..]);
        combined.truncate(aligned);

        (!combined.is_empty()).then_some(combined)
    }

    /// Take the 0-3 residual bytes at end of stream.
    pub fn take_carry(&mut self) -> Option<BytesMut> {
        let carry = self.carry.split();
        (!carry.is_empty()).then_some(carry)
    }

    /// Bytes currently held back.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }
}

/// Encrypt side: emits `IV ‖ Ciphertext`.
pub struct EncryptStage {
    session: Session,
    aligner: LaneAligner,
    iv_sent: bool,
}

impl EncryptStage {
    /// Wrap a freshly spawned session.
    pub fn new(session: Session) -> Self {
        Self { session, aligner: LaneAligner::default(), iv_sent: false }
    }

    fn send_iv(&mut self, out: &mut Vec<BytesMut>) {
        if !self.iv_sent {
            self.iv_sent = true;
            out.push(BytesMut::from(self.session.iv().as_bytes().as_slice()));
        }
    }
}

impl Stage for EncryptStage {
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        self.send_iv(out);
        if let Some(mut run) = self.aligner.align(chunk) {
            self.session.process(&mut run);
            out.push(run);
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        self.send_iv(out);
        if let Some(mut tail) = self.aligner.take_carry() {
            self.session.process(&mut tail);
            out.push(tail);
        }
        Ok(())
    }
}

enum DecryptState {
    AwaitingIv { key: MasterKey, factory: SessionFactory, head: BytesMut },
    Streaming(Session),
}

/// Decrypt side: consumes the 16-byte IV, then decrypts the remainder.
///
/// The IV may be split across any number of writes.
pub struct DecryptStage {
    state: DecryptState,
    aligner: LaneAligner,
}

impl DecryptStage {
    /// Spawn the session once the IV has arrived.
    pub fn new(key: MasterKey, factory: SessionFactory) -> Self {
        Self {
            state: DecryptState::AwaitingIv { key, factory, head: BytesMut::new() },
            aligner: LaneAligner::default(),
        }
    }

    /// Route `chunk` into the IV head until complete; return what follows it.
    fn absorb_iv(&mut self, chunk: BytesMut) -> Option<BytesMut> {
        let DecryptState::AwaitingIv { key, factory, head } = &mut self.state else {
            return Some(chunk);
        };

        head.unsplit(chunk);
        if head.len() < IV_SIZE {
            return None;
        }

        let rest = head.split_off(IV_SIZE);
        let Ok(iv) = Iv::try_from(&head[..]) else {
            unreachable!("invariant: head holds exactly IV_SIZE bytes")
        };
        let session = Session::spawn(factory, key.as_bytes(), iv);
        self.state = DecryptState::Streaming(session);
        Some(rest)
    }
}

impl Stage for DecryptStage {
    fn transform(&mut self, chunk: BytesMut, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        let Some(chunk) = self.absorb_iv(chunk) else {
            return Ok(());
        };
        let DecryptState::Streaming(session) = &mut self.state else {
            unreachable!("invariant: session spawned once the IV is complete")
        };

        if let Some(mut run) = self.aligner.align(chunk) {
            session.process(&mut run);
            out.push(run);
        }
        Ok(())
    }

    fn flush(&mut self, out: &mut Vec<BytesMut>) -> Result<(), CipherError> {
        match &mut self.state {
            DecryptState::AwaitingIv { head, .. } => {
                tracing::warn!(received = head.len(), "stream ended before IV was complete");
                Err(CipherError::StreamTruncated { context: "stream IV" })
            },
            DecryptState::Streaming(session) => {
                if let Some(mut tail) = self.aligner.take_carry() {
                    session.process(&mut tail);
                    out.push(tail);
                }
                Ok(())
            },
        }
    }
}
