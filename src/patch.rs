//! Patching: reconstructs the new sequence from the old sequence plus a
//! [`Delta`], consulting nothing but the delta itself.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::delta::{Delta, Instruction};
use crate::error::Result;

/// Applies `delta` to a random-access/seekable `old` source, writing the
/// reconstructed new sequence to `out`.
pub fn patch_seekable<R: Read + Seek, W: Write>(
    old: &mut R,
    delta: &Delta,
    out: &mut W,
) -> Result<()> {
    for instruction in &delta.instructions {
        match instruction {
            Instruction::CopyData { data, .. } => out.write_all(data)?,
            Instruction::CopyChunk {
                start_index,
                data_length,
                ..
            } => {
                old.seek(SeekFrom::Start(*start_index))?;
                let mut buf = vec![0u8; *data_length as usize];
                old.read_exact(&mut buf)?;
                out.write_all(&buf)?;
            }
        }
    }
    Ok(())
}

/// Applies `delta` to a forward-only `old` source, for embedders that
/// cannot provide random access. Falls back to reading straight through:
/// each `COPY_CHUNK`'s `start_index` must be at or after the source's
/// current position (instructions that copy backward over already-read
/// bytes cannot be satisfied this way and return an error).
pub fn patch_forward<R: Read, W: Write>(old: &mut R, delta: &Delta, out: &mut W) -> Result<()> {
    let mut position: u64 = 0;
    for instruction in &delta.instructions {
        match instruction {
            Instruction::CopyData { data, .. } => out.write_all(data)?,
            Instruction::CopyChunk {
                start_index,
                data_length,
                ..
            } => {
                if *start_index < position {
                    return Err(crate::error::Error::BackwardCopyUnsupported {
                        start_index: *start_index,
                        position,
                    });
                }
                skip_bytes(old, start_index - position)?;
                position += start_index - position;

                let mut buf = vec![0u8; *data_length as usize];
                old.read_exact(&mut buf)?;
                out.write_all(&buf)?;
                position += *data_length;
            }
        }
    }
    Ok(())
}

fn skip_bytes<R: Read>(reader: &mut R, mut count: u64) -> Result<()> {
    let mut sink = [0u8; 8192];
    while count > 0 {
        let take = count.min(sink.len() as u64) as usize;
        reader.read_exact(&mut sink[..take])?;
        count -= take as u64;
    }
    Ok(())
}
