//! Masked-array gap repair
//!
//! A single left-to-right scan tracks the last valid (unmasked) sample.
//! Whenever a valid sample follows one or more masked samples, the gap
//! between them is filled according to the [`RepairMethod`], provided it is
//! no longer than the repair limit. Leading and trailing gaps have a valid
//! sample on one side only and are filled only when the method holds the
//! value toward them or extrapolation is enabled.

use crate::constants::DEFAULT_REPAIR_DURATION;
use crate::error::FlightDataError;
use crate::runs::longest_run;
use crate::types::{MaskedArray, Sample};
use crate::Result;
use alloc::vec::Vec;
use core::ops::Range;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::debug;

/// How a masked gap is filled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairMethod {
    /// Linear interpolation between the valid samples either side
    #[default]
    Interpolate,
    /// Hold the valid sample before the gap
    FillStart,
    /// Hold the valid sample after the gap
    FillStop,
}

/// Options for [`repair_mask`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOptions {
    /// Gap filling method
    pub method: RepairMethod,

    /// Longest gap repaired, in seconds. `None` or 0 repairs every gap.
    pub repair_duration: Option<f64>,

    /// Sample rate in Hz, converting `repair_duration` to samples
    pub frequency: f64,

    /// Fill leading and trailing gaps regardless of method
    pub extrapolate: bool,

    /// Fail if the longest masked run is longer than the repair limit
    pub raise_duration_exceedance: bool,

    /// Fail if every sample is masked
    pub raise_entire_mask: bool,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            method: RepairMethod::default(),
            repair_duration: Some(DEFAULT_REPAIR_DURATION),
            frequency: 1.0,
            extrapolate: false,
            raise_duration_exceedance: false,
            raise_entire_mask: true,
        }
    }
}

impl RepairOptions {
    /// Default options: interpolate gaps of up to 10 seconds at 1 Hz
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap filling method
    pub fn method(mut self, method: RepairMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the repair limit in seconds (`None` for unlimited)
    pub fn repair_duration(mut self, seconds: Option<f64>) -> Self {
        self.repair_duration = seconds;
        self
    }

    /// Set the sample rate in Hz
    pub fn frequency(mut self, hz: f64) -> Self {
        self.frequency = hz;
        self
    }

    /// Enable extrapolation at the array ends
    pub fn extrapolate(mut self, extrapolate: bool) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    /// Fail instead of leaving over-long gaps masked
    pub fn raise_duration_exceedance(mut self, raise: bool) -> Self {
        self.raise_duration_exceedance = raise;
        self
    }

    /// Fail on entirely masked input (the default)
    pub fn raise_entire_mask(mut self, raise: bool) -> Self {
        self.raise_entire_mask = raise;
        self
    }

    /// Repair limit in samples, `None` when unlimited
    pub fn repair_samples(&self) -> Option<f64> {
        match self.repair_duration {
            Some(seconds) if seconds != 0.0 => Some(seconds * self.frequency),
            _ => None,
        }
    }
}

#[inline]
fn within_limit(limit: Option<f64>, gap: usize) -> bool {
    limit.map_or(true, |limit| gap as f64 <= limit)
}

fn fill_range(data: &mut [f64], mask: &mut [bool], range: Range<usize>, value: f64) {
    data[range.clone()].fill(value);
    mask[range].fill(false);
}

fn interpolate_range(data: &mut [f64], mask: &mut [bool], before: usize, after: usize) {
    let first = data[before];
    let step = (data[after] - first) / (after - before) as f64;
    for i in before + 1..after {
        data[i] = first + step * (i - before) as f64;
        mask[i] = false;
    }
}

/// Repair masked gaps of a `f64` array in place.
///
/// `max_samples` bounds the gaps that are repaired: an interior gap spans
/// `idx - last_valid` samples between its valid endpoints, an edge gap
/// counts its masked samples. `None` repairs every gap. Returns the number
/// of samples repaired.
pub fn repair_data_mask(
    data: &mut [f64],
    mask: &mut [bool],
    method: RepairMethod,
    max_samples: Option<f64>,
    extrapolate: bool,
) -> Result<usize> {
    if data.len() != mask.len() {
        return Err(FlightDataError::LengthMismatch {
            expected: data.len(),
            actual: mask.len(),
        });
    }

    let len = data.len();
    let mut repaired = 0;
    let mut last_valid: Option<usize> = None;

    for idx in 0..len {
        if mask[idx] {
            continue;
        }
        let gap_start = last_valid.map_or(0, |prev| prev + 1);
        let gap = idx - gap_start;
        if gap > 0 {
            let (fill, span) = match last_valid {
                None => (method == RepairMethod::FillStop || extrapolate, gap),
                Some(prev) => (true, idx - prev),
            };
            if fill && within_limit(max_samples, span) {
                match (last_valid, method) {
                    (Some(prev), RepairMethod::Interpolate) => {
                        interpolate_range(data, mask, prev, idx)
                    }
                    (Some(prev), RepairMethod::FillStart) => {
                        let value = data[prev];
                        fill_range(data, mask, gap_start..idx, value)
                    }
                    _ => {
                        let value = data[idx];
                        fill_range(data, mask, gap_start..idx, value)
                    }
                }
                repaired += gap;
            } else {
                #[cfg(feature = "logging")]
                debug!("Leaving gap of {} samples at {} unrepaired", gap, gap_start);
            }
        }
        last_valid = Some(idx);
    }

    if let Some(last) = last_valid {
        let gap = len - last - 1;
        if gap > 0 {
            if (method == RepairMethod::FillStart || extrapolate) && within_limit(max_samples, gap)
            {
                let value = data[last];
                fill_range(data, mask, last + 1..len, value);
                repaired += gap;
            } else {
                #[cfg(feature = "logging")]
                debug!("Leaving trailing gap of {} samples unrepaired", gap);
            }
        }
    }

    Ok(repaired)
}

/// Repair the masked gaps of `array` in place.
///
/// * An unmasked array, or one with no masked samples, is left untouched.
/// * An entirely masked array fails with [`FlightDataError::EntirelyMasked`]
///   unless `raise_entire_mask` is off, in which case it is left untouched.
/// * With `raise_duration_exceedance`, fails before repairing anything if
///   the longest masked run exceeds the repair limit.
///
/// Repair runs on a `f64` working copy; repaired samples are cast back to
/// `T` and unmasked. Samples that were valid are never rewritten.
pub fn repair_mask<T: Sample>(array: &mut MaskedArray<T>, options: &RepairOptions) -> Result<()> {
    let MaskedArray { data, mask } = array;
    let Some(mask) = mask.as_mut() else {
        return Ok(());
    };

    let masked = mask.iter().filter(|&&m| m).count();
    if masked == 0 {
        return Ok(());
    }
    if masked == mask.len() {
        if options.raise_entire_mask {
            return Err(FlightDataError::EntirelyMasked);
        }
        return Ok(());
    }

    let limit = options.repair_samples();
    if options.raise_duration_exceedance {
        if let Some(limit) = limit {
            let longest = longest_run(mask, true);
            if longest as f64 > limit {
                return Err(FlightDataError::RepairDurationExceeded { longest, limit });
            }
        }
    }

    let original_mask = mask.clone();
    let mut work: Vec<f64> = data.iter().map(|v| v.to_f64()).collect();
    let repaired = repair_data_mask(
        &mut work,
        mask,
        options.method,
        limit,
        options.extrapolate,
    )?;

    #[cfg(feature = "logging")]
    debug!(
        "Repaired {} of {} masked samples ({:?})",
        repaired, masked, options.method
    );
    #[cfg(not(feature = "logging"))]
    let _ = repaired;

    for (i, value) in work.into_iter().enumerate() {
        if original_mask[i] && !mask[i] {
            data[i] = T::from_f64(value);
        }
    }
    Ok(())
}

/// Copying variant of [`repair_mask`]
pub fn repaired<T: Sample>(array: &MaskedArray<T>, options: &RepairOptions) -> Result<MaskedArray<T>> {
    let mut out = array.clone();
    repair_mask(&mut out, options)?;
    Ok(out)
}
