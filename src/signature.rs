//! Signature building: the coarse content map of the old sequence.

use std::io::Read;

use crate::error::{Error, Result};
use crate::hash::jenkins_hash;

/// One fixed-length (except possibly the last) span of the old sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start_position: u64,
    pub length: u64,
    pub hash: u32,
}

/// The ordered content map of the old sequence produced by [`build_signature`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    pub chunks: Vec<Chunk>,
}

impl Signature {
    /// Largest chunk length present, or 0 for an empty signature.
    pub fn max_chunk_length(&self) -> u64 {
        self.chunks.iter().map(|c| c.length).max().unwrap_or(0)
    }

    /// Smallest chunk length present, or 0 for an empty signature.
    pub fn min_chunk_length(&self) -> u64 {
        self.chunks.iter().map(|c| c.length).min().unwrap_or(0)
    }
}

/// Builds a [`Signature`] for the old sequence read from `reader`.
///
/// Walks the sequence in fixed strides of `chunk_length`, emitting one
/// [`Chunk`] per stride. The final chunk's length may be less than
/// `chunk_length`. Requires only a single forward pass — no random
/// access into the old sequence.
pub fn build_signature<R: Read>(
    reader: &mut R,
    total_length: u64,
    chunk_length: u64,
) -> Result<Signature> {
    if chunk_length == 0 {
        return Err(Error::InvalidArgument(
            "chunk length must be at least 1".into(),
        ));
    }

    let mut signature = Signature {
        chunks: Vec::new(),
    };

    let mut start = 0u64;
    while start < total_length {
        let length = chunk_length.min(total_length - start);
        let mut block = vec![0u8; length as usize];
        reader.read_exact(&mut block).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                Error::InvalidArgument(
                    "input source yielded fewer bytes than the declared total length".into(),
                )
            } else {
                Error::Io(e)
            }
        })?;

        signature.chunks.push(Chunk {
            start_position: start,
            length,
            hash: jenkins_hash(&block),
        });

        start += length;
    }

    if total_length > 0 && signature.chunks.is_empty() {
        return Err(Error::InvalidArgument(
            "input source yielded no bytes for a non-empty sequence".into(),
        ));
    }

    Ok(signature)
}
