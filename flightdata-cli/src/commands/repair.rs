use anyhow::{Context, Result};
use colored::*;
use flightdata_core::{repair_mask, MaskedArray, RepairOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::info;

/// Samples as read from JSON; `null` marks a missing sample
#[derive(Debug, Deserialize)]
struct RepairInput {
    data: Vec<Option<f64>>,
    #[serde(default)]
    mask: Option<Vec<bool>>,
}

/// Repaired samples; samples still masked are written as `null`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RepairOutput {
    /// Sample values
    pub data: Vec<Option<f64>>,
    /// Remaining mask
    pub mask: Vec<bool>,
}

pub fn execute(input: &str, output: &str, options: &RepairOptions) -> Result<RepairOutput> {
    info!("Repairing {} with {:?}", input, options.method);

    let content =
        fs::read_to_string(input).with_context(|| format!("Failed to read input file: {}", input))?;
    let parsed: RepairInput =
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON input")?;

    let mut array = to_masked(parsed)?;
    let before = array.masked_count();
    repair_mask(&mut array, options).context("Repair failed")?;
    let after = array.masked_count();

    let result = RepairOutput {
        data: array.to_options(),
        mask: array
            .mask()
            .map_or_else(|| vec![false; array.len()], <[bool]>::to_vec),
    };
    let json = serde_json::to_string_pretty(&result)
        .with_context(|| "Failed to serialize repaired samples")?;
    fs::write(output, json).with_context(|| format!("Failed to write output file: {}", output))?;

    println!("\n=== Repair Results ===");
    println!("Samples:            {}", array.len());
    println!("Repaired:           {}", (before - after).to_string().green());
    if after > 0 {
        println!("Still masked:       {}", after.to_string().red());
    }

    Ok(result)
}

fn to_masked(input: RepairInput) -> Result<MaskedArray<f64>> {
    let nulls: Vec<bool> = input.data.iter().map(Option::is_none).collect();
    let data: Vec<f64> = input.data.iter().map(|v| v.unwrap_or(0.0)).collect();
    let mask = match input.mask {
        Some(mask) => {
            let mut mask = mask;
            if mask.len() == nulls.len() {
                for (m, &null) in mask.iter_mut().zip(&nulls) {
                    *m |= null;
                }
            }
            mask
        }
        None => nulls,
    };
    Ok(MaskedArray::new(data, mask)?)
}
