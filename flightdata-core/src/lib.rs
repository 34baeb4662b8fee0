//! # Flightdata Core
//!
//! Low-level primitives for processing raw flight data recorder streams.
//!
//! ## Modules
//!
//! - `kernels`: Wraparound word reads, constant detection, power-of-two tests
//! - `runs`: Index search and run algebra over boolean arrays
//! - `repair`: Gap repair for masked sample arrays
//! - `interpolate`: Piecewise-linear interpolation over breakpoint tables
//! - `packing`: 12-bit word packing and unpacking
//! - `aligner`: Frame synchronization for continuous bitstreams
//! - `types`: Masked arrays, frame formats and aligner configuration
//! - `constants`: Format constants and defaults

#![warn(missing_docs)]

extern crate alloc;

pub mod aligner;
pub mod constants;
pub mod error;
pub mod interpolate;
pub mod kernels;
pub mod packing;
pub mod repair;
pub mod runs;
pub mod types;

// Re-export commonly used types
pub use aligner::{ByteAligner, FrameWindow, SyncPoint};
pub use error::FlightDataError;
pub use interpolate::Interpolator;
pub use packing::{pack_12bit, unpack_12bit, unpack_12bit_to_bytes, Unpack12Bit};
pub use repair::{repair_mask, repaired, RepairMethod, RepairOptions};
pub use runs::{runs, Aggregate, Runs};
pub use types::{AlignerConfig, FrameFormat, MaskedArray, Sample};

/// Result type alias for flight data operations
pub type Result<T> = core::result::Result<T, FlightDataError>;
