//! Library entry for flightdata-cli used by integration tests and embedding.

pub mod commands;

// Re-export commands for convenience
pub use commands::*;

use flightdata_core::RepairMethod;

/// Gap filling method accepted on the command line
#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum MethodArg {
    /// Linear interpolation across the gap
    Interpolate,
    /// Hold the sample before the gap
    FillStart,
    /// Hold the sample after the gap
    FillStop,
}

impl From<MethodArg> for RepairMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Interpolate => RepairMethod::Interpolate,
            MethodArg::FillStart => RepairMethod::FillStart,
            MethodArg::FillStop => RepairMethod::FillStop,
        }
    }
}
