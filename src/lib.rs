//! Core signature/delta/patch algorithm: derives a coarse content map of
//! an old byte sequence (a [`Signature`]), uses it to synthesize a
//! compact instruction stream (a [`Delta`]) against a new byte sequence,
//! and applies that stream back to the old sequence to reconstruct the
//! new one exactly.
//!
//! File I/O, CLI argument parsing, and progress reporting are left to
//! the `rdelta` binary; this crate only ever sees byte sources and
//! sinks.

pub mod codec;
pub mod delta;
pub mod error;
pub mod hash;
pub mod patch;
pub mod signature;

pub use delta::{synthesize_delta, Delta, Instruction};
pub use error::{Error, Result};
pub use hash::{adler32, jenkins_hash};
pub use patch::{patch_forward, patch_seekable};
pub use signature::{build_signature, Chunk, Signature};

/// Default chunk length used by the CLI when `-c/--chunk` is not given.
pub const DEFAULT_CHUNK_LENGTH: u64 = 100;
