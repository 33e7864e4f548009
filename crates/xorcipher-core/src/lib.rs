//! Xorcipher Core
//!
//! Keyed PRNG stream encryption with optional integrity, as one-shot
//! envelopes or as push-based streams over unbounded data.
//!
//! # Architecture
//!
//! ```text
//! Envelope (MasterKey + SessionFactory + EntropySource)
//!    │
//!    ├── encrypt / decrypt ──► Session ──► IntegrityScheme
//!    │                                     (Plain | Lookup3 checksum | Chaskey EtM)
//!    │
//!    └── encryptor / decryptor ──► Pipeline
//!                                   ├── EncryptStage / DecryptStage (lane realignment)
//!                                   ├── ChunkInjector / ChunkVerifier (chained tags)
//!                                   └── HeaderWriter / HeaderReader (optional framing)
//! ```
//!
//! Every operation spawns a fresh session from the stored key, so no two
//! operations ever share keystream state.
//!
//! # Wire Formats
//!
//! All integers are little-endian.
//!
//! | Mode | Layout |
//! |---|---|
//! | One-shot plain | `IV(16) ‖ Ciphertext` |
//! | One-shot checksum | `IV(16) ‖ Enc(Plaintext ‖ Lookup3(4))` |
//! | One-shot authenticated | `IV(16) ‖ Tag(16) ‖ Ciphertext` |
//! | Stream chunked checksum | `IV(16) ‖ Enc(Block ‖ Hash(4) ‖ ...)` |
//! | Stream chained MAC | `(IV(16) ‖ Ciphertext)` cut into `Block ‖ Tag(16) ‖ ...` |
//!
//! # Security
//!
//! The keystreams come from non-cryptographic PRNGs with small, largely
//! linear state. Treat the output as obfuscation with tamper detection, not
//! as confidentiality against a motivated attacker.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod chunked;
pub mod cipher_stage;
pub mod config;
pub mod entropy;
pub mod envelope;
pub mod error;
pub mod header;
pub mod io;
pub mod key;
pub mod pipeline;
pub mod scheme;
pub mod session;

pub use config::{DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, StreamConfig};
pub use entropy::{EntropySource, IvGenerator, IvStrategy, SeededEntropy, SystemEntropy};
pub use envelope::Envelope;
pub use error::{CipherError, ErrorKind};
pub use header::StreamHeader;
pub use io::StreamWriter;
pub use key::{MacKey, MasterKey};
pub use pipeline::{Direction, Pipeline, Stage, StreamIntegrity};
pub use scheme::{IntegrityScheme, Mode};
pub use session::{BoxedEngine, Session, SessionFactory, Variant};
pub use xorcipher_crypto::{Iv, KeystreamEngine};
