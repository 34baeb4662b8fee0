//! Piecewise-linear interpolation over a breakpoint table

use crate::error::FlightDataError;
use crate::types::MaskedArray;
use crate::Result;
use alloc::vec::Vec;

/// Immutable table of strictly increasing `(x, y)` breakpoints.
///
/// Inside the table values are interpolated linearly between neighbouring
/// breakpoints. Outside it the first and last segments are extended.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    below_slope: f64,
    above_slope: f64,
}

impl Interpolator {
    /// Build an interpolator from at least two breakpoints with strictly
    /// increasing x values.
    pub fn new(points: &[(f64, f64)]) -> Result<Self> {
        if points.len() < 2 {
            return Err(FlightDataError::TooFewBreakpoints(points.len()));
        }
        for (index, pair) in points.windows(2).enumerate() {
            // written as a negation so NaN is rejected too
            if !(pair[1].0 > pair[0].0) {
                return Err(FlightDataError::UnorderedBreakpoints { index: index + 1 });
            }
        }

        let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
        let n = xs.len();
        let below_slope = (ys[1] - ys[0]) / (xs[1] - xs[0]);
        let above_slope = (ys[n - 1] - ys[n - 2]) / (xs[n - 1] - xs[n - 2]);

        Ok(Self {
            xs,
            ys,
            below_slope,
            above_slope,
        })
    }

    /// Breakpoints as `(x, y)` pairs
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Interpolate (or extrapolate) a single value
    pub fn interpolate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let n = self.xs.len();
        if x < self.xs[0] {
            return self.ys[0] + (x - self.xs[0]) * self.below_slope;
        }
        if x >= self.xs[n - 1] {
            return self.ys[n - 1] + (x - self.xs[n - 1]) * self.above_slope;
        }
        // xs[seg] <= x < xs[seg + 1]
        let seg = self.xs.partition_point(|&p| p <= x) - 1;
        let (x0, x1) = (self.xs[seg], self.xs[seg + 1]);
        let (y0, y1) = (self.ys[seg], self.ys[seg + 1]);
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }

    /// Interpolate every value in place
    pub fn interpolate_slice(&self, values: &mut [f64]) {
        for value in values.iter_mut() {
            *value = self.interpolate(*value);
        }
    }

    /// Interpolate the unmasked values of `array` in place
    pub fn interpolate_masked(&self, array: &mut MaskedArray<f64>) {
        let MaskedArray { data, mask } = array;
        match mask {
            Some(mask) => {
                for (value, &masked) in data.iter_mut().zip(mask.iter()) {
                    if !masked {
                        *value = self.interpolate(*value);
                    }
                }
            }
            None => self.interpolate_slice(data),
        }
    }
}
