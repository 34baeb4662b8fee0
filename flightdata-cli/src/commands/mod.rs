//! Subcommand implementations

pub mod align;
pub mod identify;
pub mod repair;
pub mod unpack;

use anyhow::{Context, Result};
use flightdata_core::AlignerConfig;
use std::fs;

/// Load an aligner configuration from a JSON file, or the default one
pub fn load_config(path: Option<&str>) -> Result<AlignerConfig> {
    let Some(path) = path else {
        return Ok(AlignerConfig::default());
    };
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse config file: {}", path))
}
