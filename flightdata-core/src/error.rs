//! Error types for flightdata operations

use alloc::string::String;

/// Errors raised on API misuse.
///
/// Absent results (no matching index, no sync word) are never errors; they
/// are reported as `None` by the functions that search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlightDataError {
    /// Two arrays that must be parallel have different lengths
    #[error("Array length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the reference array.
        expected: usize,
        /// Length of the offending array.
        actual: usize,
    },

    /// Invalid start/stop window passed to the aligner
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    /// Interpolator built with fewer than two breakpoints
    #[error("Interpolator requires at least 2 breakpoints, got {0}")]
    TooFewBreakpoints(usize),

    /// Interpolator breakpoints are not strictly increasing in x
    #[error("Breakpoint x values must be strictly increasing (at index {index})")]
    UnorderedBreakpoints {
        /// Index of the first breakpoint that is not greater than its predecessor.
        index: usize,
    },

    /// Every sample of the array is masked
    #[error("Array is entirely masked")]
    EntirelyMasked,

    /// The longest masked run is longer than the repair limit
    #[error("Longest masked run of {longest} samples exceeds repair limit of {limit} samples")]
    RepairDurationExceeded {
        /// Length of the longest masked run in samples.
        longest: usize,
        /// Repair limit in samples (`repair_duration * frequency`).
        limit: f64,
    },

    /// Aligner configuration cannot produce any frame hypothesis
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
