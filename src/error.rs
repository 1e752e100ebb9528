use std::io;

/// Errors surfaced by the signature/delta/patch core.
///
/// Mirrors the error kinds the algorithm distinguishes: a bad argument
/// to one of the builders, a malformed binary container, a
/// forward-only patch that cannot satisfy a backward copy, and I/O
/// failures passed through verbatim from the underlying source or
/// sink.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error(
        "forward-only patch cannot rewind: instruction requires old-sequence position {start_index} but the source is already past it at {position}"
    )]
    BackwardCopyUnsupported { start_index: u64, position: u64 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
