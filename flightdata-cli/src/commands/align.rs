use anyhow::{bail, Context, Result};
use bytes::Bytes;
use colored::*;
use flightdata_core::{packing::Unpack12Bit, ByteAligner};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use tracing::info;

/// Options for the `align` subcommand
#[derive(Debug, Clone)]
pub struct AlignOptions<'a> {
    /// Raw recorder dump
    pub input: &'a str,
    /// File receiving the aligned frames
    pub output: &'a str,
    /// Optional JSON aligner configuration
    pub config: Option<&'a str>,
    /// Words are big-endian
    pub big_endian: bool,
    /// Drop partial frames
    pub frames_only: bool,
    /// Override the smallest words-per-subframe
    pub min_wps: Option<u16>,
    /// Override the largest words-per-subframe
    pub max_wps: Option<u16>,
    /// First output frame written
    pub start: Option<i64>,
    /// Output frame at which writing stops
    pub stop: Option<i64>,
    /// Bytes read per chunk
    pub chunk_size: usize,
    /// Input holds packed 12-bit words
    pub packed_12bit: bool,
    /// Show a progress bar
    pub progress: bool,
}

pub fn execute(opts: &AlignOptions) -> Result<()> {
    info!("Aligning {} to {}", opts.input, opts.output);
    if opts.chunk_size == 0 {
        bail!("Chunk size must be positive");
    }

    let mut config = super::load_config(opts.config)?;
    if opts.big_endian {
        config.little_endian = false;
    }
    if opts.frames_only {
        config.frames_only = true;
    }
    if let Some(min_wps) = opts.min_wps {
        config.min_wps = min_wps;
    }
    if let Some(max_wps) = opts.max_wps {
        config.max_wps = max_wps;
    }
    let little_endian = config.little_endian;
    let mut aligner = ByteAligner::new(config).context("Invalid aligner configuration")?;

    let data = fs::read(opts.input)
        .with_context(|| format!("Failed to read input file: {}", opts.input))?;
    info!("File size: {} bytes", data.len());

    let bar = if opts.progress {
        let bar = ProgressBar::new(data.len() as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
                .context("Invalid progress template")?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let chunks = data.chunks(opts.chunk_size).inspect(|c| bar.inc(c.len() as u64));

    let file = File::create(opts.output)
        .with_context(|| format!("Failed to create output file: {}", opts.output))?;
    let mut writer = BufWriter::new(file);

    let (frames, written) = if opts.packed_12bit {
        let unpacked = Unpack12Bit::new(chunks, little_endian);
        write_frames(aligner.process(unpacked, opts.start, opts.stop)?, &mut writer)?
    } else {
        write_frames(aligner.process(chunks, opts.start, opts.stop)?, &mut writer)?
    };
    writer
        .flush()
        .with_context(|| format!("Failed to write output file: {}", opts.output))?;
    bar.finish_and_clear();

    println!("\n=== Align Results ===");
    println!("Bytes read:         {} bytes", data.len());
    println!("Frames written:     {}", frames.to_string().green());
    println!("Bytes written:      {} bytes", written);
    println!(
        "Bytes skipped:      {} bytes",
        (aligner.offset() as usize).saturating_sub(written)
    );
    if frames == 0 {
        println!("{} No frame sync found", "✗".red());
    }

    info!("Aligned frames written to: {}", opts.output);
    Ok(())
}

fn write_frames<W: Write>(frames: impl Iterator<Item = Bytes>, writer: &mut W) -> Result<(usize, usize)> {
    let mut count = 0;
    let mut written = 0;
    for frame in frames {
        writer
            .write_all(&frame)
            .context("Failed to write aligned frame")?;
        count += 1;
        written += frame.len();
    }
    Ok((count, written))
}
