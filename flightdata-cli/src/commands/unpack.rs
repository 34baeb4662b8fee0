use anyhow::{Context, Result};
use flightdata_core::{constants::PACKED_12BIT_GROUP, unpack_12bit_to_bytes};
use std::fs;
use tracing::{info, warn};

pub fn execute(input: &str, output: &str, big_endian: bool) -> Result<()> {
    info!("Unpacking 12-bit words from {} to {}", input, output);

    let packed = fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?;

    let trailing = packed.len() % PACKED_12BIT_GROUP;
    if trailing != 0 {
        warn!("Ignoring {} trailing bytes", trailing);
    }

    let words = unpack_12bit_to_bytes(&packed, !big_endian);
    fs::write(output, &words).with_context(|| format!("Failed to write output file: {}", output))?;

    info!(
        "Unpacked {} words ({} bytes)",
        words.len() / 2,
        words.len()
    );
    Ok(())
}
