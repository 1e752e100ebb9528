//! Bit-exact binary containers for [`Signature`] and [`Delta`].
//!
//! All integers are little-endian with the fixed widths tabulated in
//! the container format: 8-byte counts and offsets, 4-byte hashes,
//! 1-byte instruction tags. This is a hand-written codec rather than a
//! delegation to a generic serialization crate, because the wire layout
//! is a normative external interface with an exact byte shape that a
//! general-purpose framing (e.g. `bincode`'s default enum/int encoding)
//! does not reproduce.

use std::io::{Read, Write};

use crate::delta::{Delta, Instruction};
use crate::error::{Error, Result};
use crate::signature::{Chunk, Signature};

const COMMAND_COPY_DATA: u8 = 0x00;
const COMMAND_COPY_CHUNK: u8 = 0x01;

fn write_u64<W: Write>(w: &mut W, v: u64) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u32<W: Write>(w: &mut W, v: u32) -> Result<()> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(|_| {
        Error::MalformedContainer("unexpected end of stream reading a 8-byte field".into())
    })?;
    Ok(u64::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(|_| {
        Error::MalformedContainer("unexpected end of stream reading a 4-byte field".into())
    })?;
    Ok(u32::from_le_bytes(buf))
}

/// Serializes a [`Signature`] to its binary container.
pub fn write_signature<W: Write>(w: &mut W, signature: &Signature) -> Result<()> {
    write_u64(w, signature.chunks.len() as u64)?;
    for chunk in &signature.chunks {
        write_u64(w, chunk.start_position)?;
        write_u64(w, chunk.length)?;
        write_u32(w, chunk.hash)?;
    }
    Ok(())
}

/// Deserializes a [`Signature`] from its binary container.
pub fn read_signature<R: Read>(r: &mut R) -> Result<Signature> {
    let num_chunks = read_u64(r)?;
    let mut chunks = Vec::with_capacity(num_chunks as usize);
    for _ in 0..num_chunks {
        let start_position = read_u64(r)?;
        let length = read_u64(r)?;
        let hash = read_u32(r)?;
        chunks.push(Chunk {
            start_position,
            length,
            hash,
        });
    }
    Ok(Signature { chunks })
}

/// Serializes a [`Delta`] to its binary container.
pub fn write_delta<W: Write>(w: &mut W, delta: &Delta) -> Result<()> {
    write_u64(w, delta.data_length)?;
    write_u64(w, delta.instructions.len() as u64)?;

    for instruction in &delta.instructions {
        match instruction {
            Instruction::CopyData { start_index, data } => {
                w.write_all(&[COMMAND_COPY_DATA])?;
                write_u64(w, *start_index)?;
                write_u64(w, 0)?; // chunk_id, informational, unused for COPY_DATA
                write_u64(w, data.len() as u64)?;
                w.write_all(data)?;
            }
            Instruction::CopyChunk {
                start_index,
                data_length,
                chunk_id,
            } => {
                w.write_all(&[COMMAND_COPY_CHUNK])?;
                write_u64(w, *start_index)?;
                write_u64(w, *chunk_id)?;
                write_u64(w, *data_length)?;
            }
        }
    }
    Ok(())
}

/// Deserializes a [`Delta`] from its binary container.
pub fn read_delta<R: Read>(r: &mut R) -> Result<Delta> {
    let data_length = read_u64(r)?;
    let num_instructions = read_u64(r)?;

    let mut instructions = Vec::with_capacity(num_instructions as usize);
    for _ in 0..num_instructions {
        let mut command = [0u8; 1];
        r.read_exact(&mut command).map_err(|_| {
            Error::MalformedContainer("unexpected end of stream reading instruction tag".into())
        })?;

        let start_index = read_u64(r)?;
        let chunk_id = read_u64(r)?;
        let payload_length = read_u64(r)?;

        let instruction = match command[0] {
            COMMAND_COPY_DATA => {
                let mut data = vec![0u8; payload_length as usize];
                r.read_exact(&mut data).map_err(|_| {
                    Error::MalformedContainer(
                        "unexpected end of stream reading COPY_DATA payload".into(),
                    )
                })?;
                Instruction::CopyData { start_index, data }
            }
            COMMAND_COPY_CHUNK => Instruction::CopyChunk {
                start_index,
                data_length: payload_length,
                chunk_id,
            },
            other => {
                return Err(Error::MalformedContainer(format!(
                    "unknown instruction command byte {other:#04x}"
                )))
            }
        };
        instructions.push(instruction);
    }

    Ok(Delta {
        data_length,
        instructions,
    })
}
