//! Core types: sample conversion, masked arrays and aligner configuration

use crate::constants::{
    ARINC_717_LABEL, ARINC_717_SYNC_MASK, ARINC_717_SYNC_WORDS, ARINC_717_WPS, DEFAULT_MAX_WPS,
    DEFAULT_MIN_WPS, WORD_SIZE,
};
use crate::error::FlightDataError;
use crate::Result;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Debug;
use serde::{Deserialize, Serialize};

/// A fixed-width sample type that can round-trip through the `f64` working type
///
/// Conversions back from `f64` use `as` semantics: truncation toward zero,
/// saturating at the type bounds.
pub trait Sample: Copy + PartialEq + Debug {
    /// Widen to `f64`
    fn to_f64(self) -> f64;

    /// Narrow from `f64`
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_sample {
    ($($t:ty),*) => {
        $(
            impl Sample for $t {
                #[inline]
                fn to_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $t
                }
            }
        )*
    };
}

impl_sample!(u8, u16, u32, u64, i64, f64);

/// A sample array paired with an optional mask of invalid samples
///
/// `mask[i] == true` marks `data[i]` as invalid. A `None` mask means the
/// array is not masked at all.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedArray<T> {
    pub(crate) data: Vec<T>,
    pub(crate) mask: Option<Vec<bool>>,
}

impl<T: Sample> MaskedArray<T> {
    /// Create a masked array, checking that `mask` matches `data` in length
    pub fn new(data: Vec<T>, mask: Vec<bool>) -> Result<Self> {
        if data.len() != mask.len() {
            return Err(FlightDataError::LengthMismatch {
                expected: data.len(),
                actual: mask.len(),
            });
        }
        Ok(Self {
            data,
            mask: Some(mask),
        })
    }

    /// Create an array with no mask
    pub fn unmasked(data: Vec<T>) -> Self {
        Self { data, mask: None }
    }

    /// Build from optional values; `None` becomes a masked sample holding `fill`
    pub fn from_options(values: &[Option<T>], fill: T) -> Self {
        let data = values.iter().map(|v| v.unwrap_or(fill)).collect();
        let mask = values.iter().map(Option::is_none).collect();
        Self {
            data,
            mask: Some(mask),
        }
    }

    /// Raw sample values, including those under the mask
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// The mask, if any
    pub fn mask(&self) -> Option<&[bool]> {
        self.mask.as_deref()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no samples
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if sample `idx` is masked
    pub fn is_masked(&self, idx: usize) -> bool {
        self.mask
            .as_ref()
            .and_then(|m| m.get(idx).copied())
            .unwrap_or(false)
    }

    /// Number of masked samples
    pub fn masked_count(&self) -> usize {
        self.mask
            .as_ref()
            .map_or(0, |m| m.iter().filter(|&&masked| masked).count())
    }

    /// Sample `idx`, or `None` if it is masked or out of range
    pub fn get(&self, idx: usize) -> Option<T> {
        if self.is_masked(idx) {
            None
        } else {
            self.data.get(idx).copied()
        }
    }

    /// Samples as options, masked samples as `None`
    pub fn to_options(&self) -> Vec<Option<T>> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Split into data and mask
    pub fn into_parts(self) -> (Vec<T>, Option<Vec<bool>>) {
        (self.data, self.mask)
    }
}

/// A recorder frame format: one sync word per subframe and the subframe
/// lengths it may be recorded at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameFormat {
    /// Label reported by identification, e.g. `"717"`
    pub label: String,

    /// Expected sync word at the start of each subframe, in order
    pub sync_words: Vec<u16>,

    /// Bits of each 16-bit word compared against the sync words
    pub sync_mask: u16,

    /// Candidate words-per-subframe values
    pub wps: Vec<u16>,
}

impl FrameFormat {
    /// ARINC 717: four subframes, 12-bit sync words
    pub fn arinc_717() -> Self {
        Self {
            label: ARINC_717_LABEL.to_string(),
            sync_words: ARINC_717_SYNC_WORDS.to_vec(),
            sync_mask: ARINC_717_SYNC_MASK,
            wps: ARINC_717_WPS.to_vec(),
        }
    }

    /// Number of subframes in one frame
    pub fn subframes(&self) -> usize {
        self.sync_words.len()
    }

    /// Frame length in bytes at the given words-per-subframe
    pub fn frame_len(&self, wps: u16) -> usize {
        wps as usize * WORD_SIZE * self.subframes()
    }
}

/// ByteAligner configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// Frame formats searched for, in priority order
    pub formats: Vec<FrameFormat>,

    /// Smallest words-per-subframe considered
    pub min_wps: u16,

    /// Largest words-per-subframe considered
    pub max_wps: u16,

    /// Words are stored little-endian
    pub little_endian: bool,

    /// Emit whole frames only, dropping partial frames
    pub frames_only: bool,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            formats: alloc::vec![FrameFormat::arinc_717()],
            min_wps: DEFAULT_MIN_WPS,
            max_wps: DEFAULT_MAX_WPS,
            little_endian: true,
            frames_only: false,
        }
    }
}

impl AlignerConfig {
    /// Default configuration: ARINC 717, little-endian, partial frames kept
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the searched formats
    pub fn formats(mut self, formats: Vec<FrameFormat>) -> Self {
        self.formats = formats;
        self
    }

    /// Restrict words-per-subframe to `[min_wps, max_wps]`
    pub fn wps_range(mut self, min_wps: u16, max_wps: u16) -> Self {
        self.min_wps = min_wps;
        self.max_wps = max_wps;
        self
    }

    /// Select word byte order
    pub fn little_endian(mut self, little_endian: bool) -> Self {
        self.little_endian = little_endian;
        self
    }

    /// Emit whole frames only
    pub fn frames_only(mut self, frames_only: bool) -> Self {
        self.frames_only = frames_only;
        self
    }

    /// Check that the configuration yields at least one frame hypothesis
    pub fn validate(&self) -> Result<()> {
        if self.min_wps == 0 || self.min_wps > self.max_wps {
            return Err(FlightDataError::InvalidConfig(format!(
                "words-per-subframe range {}..={} is empty",
                self.min_wps, self.max_wps
            )));
        }
        if self.formats.is_empty() {
            return Err(FlightDataError::InvalidConfig(
                "no frame formats configured".to_string(),
            ));
        }
        for format in &self.formats {
            if format.sync_words.is_empty() {
                return Err(FlightDataError::InvalidConfig(format!(
                    "format {} has no sync words",
                    format.label
                )));
            }
            if format.sync_mask == 0 {
                return Err(FlightDataError::InvalidConfig(format!(
                    "format {} has an empty sync mask",
                    format.label
                )));
            }
        }
        if self.hypotheses().next().is_none() {
            return Err(FlightDataError::InvalidConfig(format!(
                "no words-per-subframe candidate within {}..={}",
                self.min_wps, self.max_wps
            )));
        }
        Ok(())
    }

    /// All `(format index, wps)` pairs inside the configured bounds
    pub(crate) fn hypotheses(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.formats.iter().enumerate().flat_map(move |(i, f)| {
            f.wps
                .iter()
                .copied()
                .filter(move |&wps| wps >= self.min_wps && wps <= self.max_wps)
                .map(move |wps| (i, wps))
        })
    }

    /// Length in bytes of the largest frame any hypothesis can produce
    pub fn max_frame_len(&self) -> usize {
        self.hypotheses()
            .map(|(i, wps)| self.formats[i].frame_len(wps))
            .max()
            .unwrap_or(0)
    }
}
