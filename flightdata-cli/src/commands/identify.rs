use anyhow::{Context, Result};
use colored::*;
use flightdata_core::{packing::Unpack12Bit, ByteAligner, SyncPoint};
use std::fs;
use tracing::info;

/// One-line description of a sync point, labelled by its frame format
pub fn describe(point: &SyncPoint) -> String {
    format!("{} at {} wps, offset {}", point.label, point.wps, point.offset)
}

pub fn execute(
    input: &str,
    output: Option<&str>,
    config: Option<&str>,
    big_endian: bool,
    packed_12bit: bool,
) -> Result<Vec<SyncPoint>> {
    info!("Identifying frame format of {}", input);

    let mut config = super::load_config(config)?;
    if big_endian {
        config.little_endian = false;
    }
    let little_endian = config.little_endian;
    let mut aligner = ByteAligner::new(config).context("Invalid aligner configuration")?;

    let data = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;

    let points: Vec<SyncPoint> = if packed_12bit {
        let unpacked = Unpack12Bit::new(data.chunks(64 * 1024), little_endian);
        aligner.identify(unpacked).collect()
    } else {
        aligner.identify(data.chunks(64 * 1024)).collect()
    };

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&points)
            .with_context(|| "Failed to serialize sync points")?;
        fs::write(output_path, json)
            .with_context(|| format!("Failed to write output file: {}", output_path))?;
        info!("Sync points written to: {}", output_path);
    } else if points.is_empty() {
        println!("{} No frame sync found", "✗".red());
    } else {
        println!("=== Sync Points ===");
        for point in &points {
            println!("{} {}", "✓".green(), describe(point));
        }
    }

    Ok(points)
}
