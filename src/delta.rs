//! Delta synthesis: the core single-pass matcher.
//!
//! Builds an instruction stream that reconstructs the new sequence from
//! the old sequence's signature plus whatever literal bytes the old
//! sequence does not contain, preferring `COPY_CHUNK` over `COPY_DATA`
//! whenever a signature chunk matches a window of the new sequence by
//! content hash.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;

use crate::error::{Error, Result};
use crate::hash::jenkins_hash;
use crate::signature::{Chunk, Signature};

/// One step of the reconstruction program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Append literal bytes carried inside the delta.
    CopyData {
        start_index: u64,
        data: Vec<u8>,
    },
    /// Copy `data_length` bytes from the old sequence starting at `start_index`.
    CopyChunk {
        start_index: u64,
        data_length: u64,
        chunk_id: u64,
    },
}

impl Instruction {
    pub fn data_length(&self) -> u64 {
        match self {
            Instruction::CopyData { data, .. } => data.len() as u64,
            Instruction::CopyChunk { data_length, .. } => *data_length,
        }
    }
}

/// The ordered instruction stream that reconstructs the new sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub data_length: u64,
    pub instructions: Vec<Instruction>,
}

/// A forward-only window over the new sequence, buffering at most
/// `2 * max_chunk_len` bytes at a time so synthesis runs in bounded
/// memory regardless of how large the new sequence is.
struct SlidingWindow<R: Read> {
    reader: R,
    buf: Vec<u8>,
    buf_start: u64,
    consumed: u64,
    total_len: u64,
    max_chunk_len: u64,
}

impl<R: Read> SlidingWindow<R> {
    fn new(reader: R, total_len: u64, max_chunk_len: u64) -> Self {
        SlidingWindow {
            reader,
            buf: Vec::new(),
            buf_start: 0,
            consumed: 0,
            total_len,
            max_chunk_len,
        }
    }

    /// Reads more bytes from the source until the buffer extends past
    /// `target_end` or the source is exhausted.
    fn ensure_until(&mut self, target_end: u64) -> Result<()> {
        while self.buf_start + self.buf.len() as u64 < target_end && self.consumed < self.total_len
        {
            let remaining = self.total_len - self.consumed;
            let chunk = remaining.min(8192);
            let mut tmp = vec![0u8; chunk as usize];
            self.reader.read_exact(&mut tmp).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    Error::InvalidArgument(
                        "input source yielded fewer bytes than the declared total length".into(),
                    )
                } else {
                    Error::Io(e)
                }
            })?;
            self.buf.extend_from_slice(&tmp);
            self.consumed += chunk;
        }
        Ok(())
    }

    /// Tops the buffer back up to its full capacity (`2 * max_chunk_len`).
    fn refill(&mut self) -> Result<()> {
        let target = self.buf_start + 2 * self.max_chunk_len;
        self.ensure_until(target)
    }

    /// Drops buffered bytes before `offset`; they are no longer needed.
    fn trim_before(&mut self, offset: u64) {
        if offset > self.buf_start {
            let drop_n = ((offset - self.buf_start) as usize).min(self.buf.len());
            self.buf.drain(..drop_n);
            self.buf_start += drop_n as u64;
        }
    }

    /// Returns a copy of `[start, start+len)`, reading further from the
    /// source if the range is not yet buffered.
    fn get_range(&mut self, start: u64, len: u64) -> Result<Vec<u8>> {
        self.ensure_until(start + len)?;
        let lo = (start - self.buf_start) as usize;
        let hi = lo + len as usize;
        Ok(self.buf[lo..hi].to_vec())
    }

    /// Reads all remaining bytes of the source from `start` to the end,
    /// regardless of the sliding-window capacity. Used for the final
    /// trailing flush.
    fn drain_to_end(&mut self, start: u64) -> Result<Vec<u8>> {
        self.ensure_until(self.total_len)?;
        let lo = (start - self.buf_start) as usize;
        Ok(self.buf[lo..].to_vec())
    }
}

/// Synthesizes a [`Delta`] describing how to reconstruct the new
/// sequence (read from `new_reader`, of total length `new_length`) from
/// the old sequence's `signature`.
pub fn synthesize_delta<R: Read>(
    signature: &Signature,
    new_reader: R,
    new_length: u64,
) -> Result<Delta> {
    if signature.chunks.is_empty() {
        return Err(Error::InvalidArgument("signature is empty".into()));
    }

    let mut hash_chunk_map: HashMap<u32, (Chunk, u64)> = HashMap::new();
    let mut chunk_lengths: BTreeSet<u64> = BTreeSet::new();
    for (id, chunk) in signature.chunks.iter().enumerate() {
        // First-insertion wins on hash collision between distinct chunks.
        hash_chunk_map
            .entry(chunk.hash)
            .or_insert((*chunk, id as u64));
        chunk_lengths.insert(chunk.length);
    }

    let lmin = signature.min_chunk_length();
    let lmax = signature.max_chunk_length();

    let mut window = SlidingWindow::new(new_reader, new_length, lmax);
    window.refill()?;

    let mut delta = Delta::default();
    let mut data_index: u64 = 0;
    let mut chunk_index: u64 = 0;

    while data_index < new_length {
        if chunk_index + lmin > new_length {
            let data = window.drain_to_end(data_index)?;
            push_copy_data(&mut delta, data_index, data);
            data_index = new_length;
            break;
        }

        let mut matched = false;
        for &length in chunk_lengths.iter().rev() {
            if chunk_index + length > new_length {
                continue;
            }

            let candidate = window.get_range(chunk_index, length)?;
            let candidate_hash = jenkins_hash(&candidate);

            if let Some((chunk, chunk_id)) = hash_chunk_map.get(&candidate_hash).copied() {
                if data_index < chunk_index {
                    let literal = window.get_range(data_index, chunk_index - data_index)?;
                    push_copy_data(&mut delta, data_index, literal);
                }

                delta.instructions.push(Instruction::CopyChunk {
                    start_index: chunk.start_position,
                    data_length: chunk.length,
                    chunk_id,
                });
                delta.data_length += chunk.length;

                chunk_index += chunk.length;
                data_index = chunk_index;
                window.trim_before(data_index);
                window.refill()?;
                matched = true;
                break;
            }
        }

        if matched {
            continue;
        }

        chunk_index += 1;
        if chunk_index - data_index >= lmax {
            let literal = window.get_range(data_index, chunk_index - data_index)?;
            push_copy_data(&mut delta, data_index, literal);
            data_index = chunk_index;
            window.trim_before(data_index);
            window.refill()?;
        }
    }

    Ok(delta)
}

fn push_copy_data(delta: &mut Delta, start_index: u64, data: Vec<u8>) {
    if data.is_empty() {
        return;
    }
    delta.data_length += data.len() as u64;
    delta.instructions.push(Instruction::CopyData {
        start_index,
        data,
    });
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::signature::build_signature;
    use std::io::Cursor;

    fn sig_for(data: &[u8], chunk_len: u64) -> Signature {
        let mut cursor = Cursor::new(data.to_vec());
        build_signature(&mut cursor, data.len() as u64, chunk_len).unwrap()
    }

    #[test]
    fn identity_delta_on_uniform_data_is_all_copy_chunk() {
        // All seven chunks of "A"*700 share one Jenkins hash, so the
        // hash-only matcher's first-insertion-wins rule for colliding
        // hashes collapses every match onto chunk 0. The reconstruction
        // is still byte-exact because every chunk's content is
        // identical.
        let old = vec![b'A'; 700];
        let sig = sig_for(&old, 100);

        let new_reader = Cursor::new(old.clone());
        let delta = synthesize_delta(&sig, new_reader, old.len() as u64).unwrap();

        assert_eq!(delta.instructions.len(), 7);
        assert_eq!(delta.data_length, 700);
        for instr in &delta.instructions {
            assert!(matches!(instr, Instruction::CopyChunk { chunk_id: 0, .. }));
        }
    }

    #[test]
    fn identity_delta_on_distinct_chunks_preserves_chunk_order() {
        let old: Vec<u8> = (0..700u32).map(|i| (i % 256) as u8).collect();
        let sig = sig_for(&old, 100);

        let new_reader = Cursor::new(old.clone());
        let delta = synthesize_delta(&sig, new_reader, old.len() as u64).unwrap();

        assert_eq!(delta.instructions.len(), 7);
        assert_eq!(delta.data_length, 700);
        for (i, instr) in delta.instructions.iter().enumerate() {
            match instr {
                Instruction::CopyChunk { chunk_id, .. } => assert_eq!(*chunk_id, i as u64),
                other => panic!("expected CopyChunk, got {other:?}"),
            }
        }
    }

    #[test]
    fn full_literal_when_nothing_matches() {
        let old = vec![b'A'; 300];
        let sig = sig_for(&old, 100);

        let new_data = vec![b'Z'; 250];
        let new_reader = Cursor::new(new_data.clone());
        let delta = synthesize_delta(&sig, new_reader, new_data.len() as u64).unwrap();

        assert_eq!(delta.data_length, 250);
        let mut rebuilt = Vec::new();
        for instr in &delta.instructions {
            match instr {
                Instruction::CopyData { data, .. } => rebuilt.extend_from_slice(data),
                Instruction::CopyChunk { .. } => panic!("expected no chunk copies"),
            }
        }
        assert_eq!(rebuilt, new_data);
    }

    #[test]
    fn single_byte_modification_falls_back_to_copy_data_for_that_chunk() {
        let old: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();
        let sig = sig_for(&old, 100);

        let mut modified = old.clone();
        modified[150] ^= 0xFF;

        let new_reader = Cursor::new(modified.clone());
        let delta = synthesize_delta(&sig, new_reader, modified.len() as u64).unwrap();

        let chunk_copies = delta
            .instructions
            .iter()
            .filter(|i| matches!(i, Instruction::CopyChunk { .. }))
            .count();
        // Chunk 0 survives untouched; chunk 1 (the modified one) does not.
        assert!(chunk_copies < 3);
        assert!(delta
            .instructions
            .iter()
            .any(|i| matches!(i, Instruction::CopyData { .. })));
    }

    #[test]
    fn multi_change_reordering_scenario() {
        let old: Vec<u8> = (0..650u32).map(|i| (i % 256) as u8).collect();
        let sig = sig_for(&old, 100);

        let literal_a = vec![1u8; 100];
        let literal_b = vec![2u8; 5];
        let literal_c = vec![3u8; 5];

        let mut new_data = Vec::new();
        new_data.extend_from_slice(&literal_a);
        new_data.extend_from_slice(&literal_b);
        new_data.extend_from_slice(&old[100..200]);
        new_data.extend_from_slice(&old[300..400]);
        new_data.extend_from_slice(&old[400..500]);
        new_data.extend_from_slice(&literal_c);
        new_data.extend_from_slice(&old[600..650]);
        new_data.extend_from_slice(&old[200..300]);
        new_data.extend_from_slice(&old[500..600]);
        new_data.extend_from_slice(&literal_c);

        let new_reader = Cursor::new(new_data.clone());
        let delta = synthesize_delta(&sig, new_reader, new_data.len() as u64).unwrap();

        assert_eq!(delta.data_length, 665);
        assert_eq!(delta.instructions.len(), 10);

        let expected_chunk_ids = [None, None, Some(1), Some(3), Some(4), None, Some(6), Some(2), Some(5), None];
        for (instr, expected) in delta.instructions.iter().zip(expected_chunk_ids.iter()) {
            match (instr, expected) {
                (Instruction::CopyData { .. }, None) => {}
                (Instruction::CopyChunk { chunk_id, .. }, Some(id)) => {
                    assert_eq!(*chunk_id, *id as u64)
                }
                (instr, expected) => panic!("mismatch: {instr:?} vs {expected:?}"),
            }
        }
    }

    #[test]
    fn rejects_empty_signature() {
        let sig = Signature::default();
        let new_reader = Cursor::new(vec![1, 2, 3]);
        let err = synthesize_delta(&sig, new_reader, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
