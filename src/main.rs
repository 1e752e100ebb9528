use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use rdelta::{codec, patch_seekable};

mod cli;

use cli::{Command, CliOptions};

fn main() -> Result<()> {
    let opts = CliOptions::parse();

    let level = if opts.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match opts.command {
        Command::Signature(args) => {
            let old_file = open_for_reading(&args.old_file)?;
            let old_len = old_file
                .metadata()
                .with_context(|| format!("reading metadata for {}", args.old_file.display()))?
                .len();

            info!(
                "building signature for {} ({old_len} bytes, chunk length {})",
                args.old_file.display(),
                args.chunk_length
            );

            let mut reader = BufReader::new(old_file);
            let signature = rdelta::build_signature(&mut reader, old_len, args.chunk_length)
                .with_context(|| format!("building signature for {}", args.old_file.display()))?;

            let out = create_for_writing(&args.signature_file)?;
            let mut writer = BufWriter::new(out);
            codec::write_signature(&mut writer, &signature).with_context(|| {
                format!("writing signature file {}", args.signature_file.display())
            })?;

            info!(
                "wrote signature file {} ({} chunks)",
                args.signature_file.display(),
                signature.chunks.len()
            );
        }

        Command::Delta(args) => {
            let signature_file = open_for_reading(&args.signature_file)?;
            let mut signature_reader = BufReader::new(signature_file);
            let signature = codec::read_signature(&mut signature_reader).with_context(|| {
                format!("reading signature file {}", args.signature_file.display())
            })?;

            let new_file = open_for_reading(&args.new_file)?;
            let new_len = new_file
                .metadata()
                .with_context(|| format!("reading metadata for {}", args.new_file.display()))?
                .len();

            info!(
                "synthesizing delta for {} against signature {}",
                args.new_file.display(),
                args.signature_file.display()
            );

            let new_reader = BufReader::new(new_file);
            let delta = rdelta::synthesize_delta(&signature, new_reader, new_len)
                .with_context(|| format!("synthesizing delta for {}", args.new_file.display()))?;

            let out = create_for_writing(&args.delta_file)?;
            let mut writer = BufWriter::new(out);
            codec::write_delta(&mut writer, &delta)
                .with_context(|| format!("writing delta file {}", args.delta_file.display()))?;

            info!(
                "wrote delta file {} ({} instructions, {} bytes reconstructed)",
                args.delta_file.display(),
                delta.instructions.len(),
                delta.data_length
            );
        }

        Command::Patch(args) => {
            let mut old_file = open_for_reading(&args.old_file)?;

            let delta_file = open_for_reading(&args.delta_file)?;
            let mut delta_reader = BufReader::new(delta_file);
            let delta = codec::read_delta(&mut delta_reader)
                .with_context(|| format!("reading delta file {}", args.delta_file.display()))?;

            info!(
                "applying delta {} to {} -> {}",
                args.delta_file.display(),
                args.old_file.display(),
                args.out_file.display()
            );

            let out = create_for_writing(&args.out_file)?;
            let mut writer = BufWriter::new(out);
            patch_seekable(&mut old_file, &delta, &mut writer)
                .with_context(|| format!("applying patch to {}", args.old_file.display()))?;

            info!("wrote {}", args.out_file.display());
        }
    }

    Ok(())
}

fn open_for_reading(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("cannot open file for reading: {}", path.display()))
}

fn create_for_writing(path: &Path) -> Result<File> {
    File::create(path)
        .with_context(|| format!("cannot open file for writing: {}", path.display()))
}
