use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Args, Debug)]
pub struct SignatureArgs {
    /// File to compute a signature for.
    pub old_file: PathBuf,

    /// Where to write the computed signature.
    pub signature_file: PathBuf,

    /// Chunk length in bytes used to build the signature.
    #[arg(short = 'c', long = "chunk", value_name = "N", default_value_t = rdelta::DEFAULT_CHUNK_LENGTH)]
    pub chunk_length: u64,
}

#[derive(Args, Debug)]
pub struct DeltaArgs {
    /// Signature of the old file.
    pub signature_file: PathBuf,

    /// New file to diff against the signature.
    pub new_file: PathBuf,

    /// Where to write the computed delta.
    pub delta_file: PathBuf,
}

#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Old file the delta was computed against.
    pub old_file: PathBuf,

    /// Delta produced by the `delta` subcommand.
    pub delta_file: PathBuf,

    /// Where to write the reconstructed file.
    pub out_file: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Derive a signature from an old file.
    Signature(SignatureArgs),
    /// Derive a delta from a signature and a new file.
    Delta(DeltaArgs),
    /// Apply a delta to an old file to reconstruct the new file.
    Patch(PatchArgs),
}

#[derive(Parser, Debug)]
#[command(name = "rdelta", about = "Compact binary signature/delta/patch toolkit")]
pub struct CliOptions {
    #[command(subcommand)]
    pub command: Command,

    /// Raise the log level to show progress as each phase runs.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
