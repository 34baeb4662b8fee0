//! Index search and run-length algebra over boolean arrays
//!
//! A run is a maximal half-open interval `[start, stop)` where the array
//! holds a constant value equal to a `matching` flag. Runs are derived on
//! demand by [`runs`] and never stored.
//!
//! Indices follow slice conventions: negative values count from the end and
//! out-of-range values clamp (see [`array_wraparound_idx`]). Internally the
//! scans use a sentinel for "no index" and convert it to `None` before it
//! crosses the module boundary.

use alloc::vec;
use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::ops::Range;

use crate::error::FlightDataError;
use crate::Result;

/// Reserved "absent index" value, never a reachable index.
const NONE_IDX: isize = isize::MIN;

#[inline]
fn to_option(idx: isize) -> Option<usize> {
    if idx == NONE_IDX {
        None
    } else {
        Some(idx as usize)
    }
}

#[inline]
fn wraparound_raw(idx: isize, length: usize, is_stop: bool) -> usize {
    let last = if is_stop {
        length
    } else {
        length.saturating_sub(1)
    };
    if idx == NONE_IDX {
        last
    } else if idx < 0 {
        if idx.unsigned_abs() <= length {
            length - idx.unsigned_abs()
        } else {
            0
        }
    } else if idx as usize >= length {
        last
    } else {
        idx as usize
    }
}

/// Map a possibly negative or absent index to a concrete index into an
/// array of `length` elements.
///
/// * `None` maps to `length` for a stop bound, otherwise `length - 1`.
/// * A negative index with `|idx| <= length` maps to `length + idx`; more
///   negative values clamp to 0.
/// * Indices `>= length` clamp to `length` (stop) or `length - 1`.
pub fn array_wraparound_idx(idx: Option<isize>, length: usize, is_stop: bool) -> usize {
    wraparound_raw(idx.unwrap_or(NONE_IDX), length, is_stop)
}

/// Normalize optional `start`/`stop` bounds into a (possibly empty) window.
#[inline]
fn window(length: usize, start: Option<isize>, stop: Option<isize>) -> (usize, usize) {
    let start = start.map_or(0, |s| wraparound_raw(s, length, true));
    let stop = stop.map_or(length, |s| wraparound_raw(s, length, true));
    (start, stop)
}

fn prev_idx_raw(
    array: &[bool],
    idx: isize,
    matching: bool,
    start: Option<isize>,
    stop: Option<isize>,
) -> isize {
    let (start, stop) = window(array.len(), start, stop);
    let idx = wraparound_raw(idx, array.len(), true).min(stop);
    if start >= idx {
        return NONE_IDX;
    }
    (start..idx)
        .rev()
        .find(|&j| array[j] == matching)
        .map_or(NONE_IDX, |j| j as isize)
}

fn next_idx_raw(
    array: &[bool],
    idx: isize,
    matching: bool,
    start: Option<isize>,
    stop: Option<isize>,
) -> isize {
    let (start, stop) = window(array.len(), start, stop);
    let idx = wraparound_raw(idx, array.len(), true).max(start);
    if idx >= stop {
        return NONE_IDX;
    }
    (idx..stop)
        .find(|&j| array[j] == matching)
        .map_or(NONE_IDX, |j| j as isize)
}

fn nearest_idx_raw(
    array: &[bool],
    idx: isize,
    matching: bool,
    start: Option<isize>,
    stop: Option<isize>,
) -> isize {
    if array.is_empty() {
        return NONE_IDX;
    }
    let (start, stop) = window(array.len(), start, stop);
    let idx = wraparound_raw(idx, array.len(), false);
    if start >= stop || start > idx || stop <= idx {
        return NONE_IDX;
    }
    if array[idx] == matching {
        return idx as isize;
    }
    let mut radius = 1;
    loop {
        let fwd = idx + radius;
        let fwd_ok = fwd < stop;
        let bwd_ok = radius <= idx - start;
        if !fwd_ok && !bwd_ok {
            return NONE_IDX;
        }
        if fwd_ok && array[fwd] == matching {
            return fwd as isize;
        }
        if bwd_ok && array[idx - radius] == matching {
            return (idx - radius) as isize;
        }
        radius += 1;
    }
}

/// Find the closest index before `idx` (exclusive) whose value equals
/// `matching`, searching no further back than `start`.
pub fn prev_idx(
    array: &[bool],
    idx: isize,
    matching: bool,
    start: Option<isize>,
    stop: Option<isize>,
) -> Option<usize> {
    to_option(prev_idx_raw(array, idx, matching, start, stop))
}

/// Find the first index at or after `idx` whose value equals `matching`,
/// within `[start, stop)`.
pub fn next_idx(
    array: &[bool],
    idx: isize,
    matching: bool,
    start: Option<isize>,
    stop: Option<isize>,
) -> Option<usize> {
    to_option(next_idx_raw(array, idx, matching, start, stop))
}

/// Find the index closest to `idx` whose value equals `matching`.
///
/// Returns `idx` itself if it matches. Otherwise the search radius grows by
/// one on each step and the forward candidate is checked before the backward
/// one, so equal distances resolve forward. Returns `None` if the window
/// `[start, stop)` is empty, does not contain `idx`, or holds no match.
pub fn nearest_idx(
    array: &[bool],
    idx: isize,
    matching: bool,
    start: Option<isize>,
    stop: Option<isize>,
) -> Option<usize> {
    to_option(nearest_idx_raw(array, idx, matching, start, stop))
}

/// Return the run of `matching` values containing or nearest to `idx`.
pub fn nearest_slice(array: &[bool], idx: isize, matching: bool) -> Option<Range<usize>> {
    let nearest = to_option(nearest_idx_raw(array, idx, matching, None, None))?;
    let idx = wraparound_raw(idx, array.len(), false);
    let len = array.len();

    let extend_back = |mut start: usize| {
        while start > 0 && array[start - 1] == matching {
            start -= 1;
        }
        start
    };
    let extend_fwd = |mut stop: usize| {
        while stop < len && array[stop] == matching {
            stop += 1;
        }
        stop
    };

    let range = if nearest == idx {
        extend_back(idx)..extend_fwd(idx + 1)
    } else if nearest > idx {
        nearest..extend_fwd(nearest + 1)
    } else {
        extend_back(nearest)..nearest + 1
    };
    Some(range)
}

/// Lazy iterator over the runs of one value in a boolean array
#[derive(Debug, Clone)]
pub struct Runs<'a> {
    array: &'a [bool],
    matching: bool,
    pos: usize,
}

impl Iterator for Runs<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.array.len();
        while self.pos < len && self.array[self.pos] != self.matching {
            self.pos += 1;
        }
        if self.pos >= len {
            return None;
        }
        let start = self.pos;
        while self.pos < len && self.array[self.pos] == self.matching {
            self.pos += 1;
        }
        Some(start..self.pos)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.array.len() - self.pos;
        (0, Some(remaining.div_ceil(2)))
    }
}

impl FusedIterator for Runs<'_> {}

/// Iterate the maximal runs of `matching` in `array`
pub fn runs(array: &[bool], matching: bool) -> Runs<'_> {
    Runs {
        array,
        matching,
        pos: 0,
    }
}

/// Iterate the maximal runs of `true` in `array`
pub fn runs_of_ones(array: &[bool]) -> Runs<'_> {
    runs(array, true)
}

/// Length of the longest run of `matching` (0 if there is none)
pub fn longest_run(array: &[bool], matching: bool) -> usize {
    runs(array, matching).map(|r| r.len()).max().unwrap_or(0)
}

/// Demote the first `min(size, run_length)` elements of every run of
/// `matching` to `!matching`, in place.
pub fn contract_runs(array: &mut [bool], size: usize, matching: bool) -> &mut [bool] {
    if size == 0 {
        return array;
    }
    let found: Vec<Range<usize>> = runs(array, matching).collect();
    for run in found {
        let end = run.end.min(run.start + size);
        array[run.start..end].fill(!matching);
    }
    array
}

/// Copying variant of [`contract_runs`]
pub fn contract_runs_to_vec(array: &[bool], size: usize, matching: bool) -> Vec<bool> {
    let mut out = array.to_vec();
    contract_runs(&mut out, size, matching);
    out
}

/// Rewrite every run of `matching` no longer than `floor(seconds * hz)`
/// samples to `!matching`, in place.
pub fn remove_small_runs(array: &mut [bool], seconds: f64, hz: f64, matching: bool) -> &mut [bool] {
    let size = (seconds * hz).floor();
    if !(size >= 1.0) {
        return array;
    }
    let size = size as usize;
    let small: Vec<Range<usize>> = runs(array, matching)
        .filter(|r| r.len() <= size)
        .collect();
    for run in small {
        array[run].fill(!matching);
    }
    array
}

/// Copying variant of [`remove_small_runs`]
pub fn remove_small_runs_to_vec(array: &[bool], seconds: f64, hz: f64, matching: bool) -> Vec<bool> {
    let mut out = array.to_vec();
    remove_small_runs(&mut out, seconds, hz, matching);
    out
}

/// Mark every run of `a | b` that contains at least one index where both
/// `a` and `b` are true.
///
/// The result is symmetric in `a` and `b`.
pub fn section_overlap(a: &[bool], b: &[bool]) -> Result<Vec<bool>> {
    if a.len() != b.len() {
        return Err(FlightDataError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let either: Vec<bool> = a.iter().zip(b).map(|(&x, &y)| x || y).collect();
    let mut out = vec![false; a.len()];
    for run in runs(&either, true) {
        if run.clone().any(|i| a[i] && b[i]) {
            out[run].fill(true);
        }
    }
    Ok(out)
}

/// Which extreme [`aggregate_values`] picks within each run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Largest value
    Max,
    /// Smallest value
    Min,
    /// Value with the largest magnitude
    MaxAbs,
    /// Value with the smallest magnitude
    MinAbs,
}

impl Aggregate {
    #[inline]
    fn key(self, value: f64) -> f64 {
        match self {
            Aggregate::Max | Aggregate::Min => value,
            Aggregate::MaxAbs | Aggregate::MinAbs => value.abs(),
        }
    }

    #[inline]
    fn better(self, candidate: f64, best: f64) -> bool {
        match self {
            Aggregate::Max | Aggregate::MaxAbs => candidate > best,
            Aggregate::Min | Aggregate::MinAbs => candidate < best,
        }
    }
}

/// Lazy iterator returned by [`aggregate_values`]
#[derive(Debug, Clone)]
pub struct AggregateValues<'a> {
    mode: Aggregate,
    data: &'a [f64],
    mask: &'a [bool],
    runs: Runs<'a>,
}

impl Iterator for AggregateValues<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let run = self.runs.next()?;
            let mut best: Option<(usize, f64)> = None;
            for i in run {
                if self.mask[i] || self.data[i].is_nan() {
                    continue;
                }
                let key = self.mode.key(self.data[i]);
                match best {
                    Some((_, best_key)) if !self.mode.better(key, best_key) => {}
                    _ => best = Some((i, key)),
                }
            }
            if let Some((i, _)) = best {
                return Some((i, self.data[i]));
            }
        }
    }
}

impl FusedIterator for AggregateValues<'_> {}

/// For each run of `true` in `matching`, yield the index and value of the
/// unmasked sample selected by `mode`. NaN samples are ignored like masked
/// ones, and runs with nothing left to compare are skipped; ties keep the
/// first occurrence.
pub fn aggregate_values<'a>(
    mode: Aggregate,
    data: &'a [f64],
    mask: &'a [bool],
    matching: &'a [bool],
) -> Result<AggregateValues<'a>> {
    for other in [mask.len(), matching.len()] {
        if other != data.len() {
            return Err(FlightDataError::LengthMismatch {
                expected: data.len(),
                actual: other,
            });
        }
    }
    Ok(AggregateValues {
        mode,
        data,
        mask,
        runs: runs_of_ones(matching),
    })
}

/// OR-compose half-open `(start, stop)` slices into a boolean array.
///
/// Bounds follow [`array_wraparound_idx`]; `None` means the array edge.
/// Inverted or empty slices contribute nothing.
pub fn slices_to_array<I>(size: usize, slices: I) -> Vec<bool>
where
    I: IntoIterator<Item = (Option<isize>, Option<isize>)>,
{
    let mut out = vec![false; size];
    for (start, stop) in slices {
        let (start, stop) = window(size, start, stop);
        if start < stop {
            out[start..stop].fill(true);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: bool = true;
    const F: bool = false;

    #[test]
    fn test_wraparound() {
        assert_eq!(array_wraparound_idx(None, 10, true), 10);
        assert_eq!(array_wraparound_idx(None, 10, false), 9);
        assert_eq!(array_wraparound_idx(Some(-3), 10, false), 7);
        assert_eq!(array_wraparound_idx(Some(-10), 10, true), 0);
        assert_eq!(array_wraparound_idx(Some(-11), 10, true), 0);
        assert_eq!(array_wraparound_idx(Some(12), 10, true), 10);
        assert_eq!(array_wraparound_idx(Some(12), 10, false), 9);
        assert_eq!(array_wraparound_idx(Some(4), 10, false), 4);
        assert_eq!(array_wraparound_idx(None, 0, false), 0);
    }

    #[test]
    fn test_prev_next_idx() {
        let array = [F, T, F, F, T, F];
        assert_eq!(prev_idx(&array, 4, T, None, None), Some(1));
        assert_eq!(prev_idx(&array, 5, T, None, None), Some(4));
        assert_eq!(prev_idx(&array, 1, T, None, None), None);
        assert_eq!(prev_idx(&array, 4, T, Some(2), None), None);
        assert_eq!(prev_idx(&array, -1, T, None, None), Some(4));

        assert_eq!(next_idx(&array, 0, T, None, None), Some(1));
        assert_eq!(next_idx(&array, 1, T, None, None), Some(1));
        assert_eq!(next_idx(&array, 2, T, None, None), Some(4));
        assert_eq!(next_idx(&array, 2, T, None, Some(4)), None);
        assert_eq!(next_idx(&array, 5, T, None, None), None);
        assert_eq!(next_idx(&array, 0, F, Some(1), None), Some(2));
        assert_eq!(next_idx(&[], 0, T, None, None), None);
    }

    #[test]
    fn test_nearest_idx() {
        let array = [F, F, T, F, F, F, T, F];
        assert_eq!(nearest_idx(&array, 2, T, None, None), Some(2));
        assert_eq!(nearest_idx(&array, 0, T, None, None), Some(2));
        assert_eq!(nearest_idx(&array, 3, T, None, None), Some(2));
        // equal distance resolves forward
        assert_eq!(nearest_idx(&array, 4, T, None, None), Some(6));
        assert_eq!(nearest_idx(&array, 7, T, None, None), Some(6));
        assert_eq!(nearest_idx(&array, 4, T, Some(3), None), Some(6));
        assert_eq!(nearest_idx(&array, 4, T, Some(3), Some(6)), None);
        assert_eq!(nearest_idx(&array, 1, T, Some(3), None), None);
        assert_eq!(nearest_idx(&array, 4, T, Some(5), Some(4)), None);
        assert_eq!(nearest_idx(&[F, F], 0, T, None, None), None);
        assert_eq!(nearest_idx(&[], 0, T, None, None), None);
    }

    #[test]
    fn test_nearest_slice() {
        let array = [F, T, T, F, F, F, T, T, T, F];
        assert_eq!(nearest_slice(&array, 2, T), Some(1..3));
        assert_eq!(nearest_slice(&array, 7, T), Some(6..9));
        assert_eq!(nearest_slice(&array, 0, T), Some(1..3));
        assert_eq!(nearest_slice(&array, 3, T), Some(1..3));
        // 2 and 6 are both two away from 4
        assert_eq!(nearest_slice(&array, 4, T), Some(6..9));
        assert_eq!(nearest_slice(&array, 5, T), Some(6..9));
        assert_eq!(nearest_slice(&array, 9, T), Some(6..9));
        assert_eq!(nearest_slice(&array, 4, F), Some(3..6));
        assert_eq!(nearest_slice(&[F, F], 1, T), None);
    }

    #[test]
    fn test_runs_of_ones() {
        let array = [T, T, F, T, F, F, T];
        let found: Vec<_> = runs_of_ones(&array).collect();
        assert_eq!(found, vec![0..2, 3..4, 6..7]);
        let zeros: Vec<_> = runs(&array, F).collect();
        assert_eq!(zeros, vec![2..3, 4..6]);
        assert_eq!(runs_of_ones(&[]).count(), 0);
        assert_eq!(longest_run(&array, F), 2);
        assert_eq!(longest_run(&[F, F], T), 0);
    }

    #[test]
    fn test_contract_runs() {
        let mut array = [T, T, T, F, T, F, T, T, T, T];
        contract_runs(&mut array, 2, T);
        assert_eq!(array, [F, F, T, F, F, F, F, F, T, T]);

        let original = [T, T, F, T];
        assert_eq!(contract_runs_to_vec(&original, 0, T), original.to_vec());
        assert_eq!(contract_runs_to_vec(&original, 5, T), vec![F, F, F, F]);
        assert_eq!(contract_runs_to_vec(&original, 1, F), vec![T, T, T, T]);
    }

    #[test]
    fn test_remove_small_runs() {
        let mut array = [T, F, T, T, F, T, T, T, F];
        remove_small_runs(&mut array, 1.0, 2.0, T);
        assert_eq!(array, [F, F, F, F, F, T, T, T, F]);

        let original = [T, F, T, T];
        assert_eq!(remove_small_runs_to_vec(&original, 0.0, 8.0, T), original.to_vec());
        // 0.4 * 4 = 1.6 -> 1
        assert_eq!(
            remove_small_runs_to_vec(&original, 0.4, 4.0, T),
            vec![F, F, T, T]
        );
        assert_eq!(
            remove_small_runs_to_vec(&original, 1.0, 1.0, F),
            vec![T, T, T, T]
        );
    }

    #[test]
    fn test_section_overlap() {
        let a = [F, T, F, T, F, F, F, F, T, T, F, F, F];
        let b = [F, T, T, F, F, F, T, F, T, T, T, T, F];
        let expected = vec![F, T, T, T, F, F, F, F, T, T, T, T, F];
        assert_eq!(section_overlap(&a, &b).unwrap(), expected);
        assert_eq!(section_overlap(&b, &a).unwrap(), expected);

        assert_eq!(
            section_overlap(&[T, F], &[F, T]).unwrap(),
            vec![F, F]
        );
        assert!(matches!(
            section_overlap(&[T], &[T, F]),
            Err(FlightDataError::LengthMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_aggregate_values() {
        let data = [1.0, -5.0, 3.0, 0.0, 7.0, -9.0, 2.0, 4.0];
        let mask = [F, F, F, F, F, T, T, F];
        let matching = [T, T, T, F, T, T, T, F];

        let max: Vec<_> = aggregate_values(Aggregate::Max, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert_eq!(max, vec![(2, 3.0), (4, 7.0)]);

        let min: Vec<_> = aggregate_values(Aggregate::Min, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert_eq!(min, vec![(1, -5.0), (4, 7.0)]);

        let max_abs: Vec<_> = aggregate_values(Aggregate::MaxAbs, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert_eq!(max_abs, vec![(1, -5.0), (4, 7.0)]);

        let min_abs: Vec<_> = aggregate_values(Aggregate::MinAbs, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert_eq!(min_abs, vec![(0, 1.0), (4, 7.0)]);
    }

    #[test]
    fn test_aggregate_skips_fully_masked_runs() {
        let data = [1.0, 2.0, 3.0];
        let mask = [T, F, T];
        let matching = [T, F, T];
        let out: Vec<_> = aggregate_values(Aggregate::Max, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert!(out.is_empty());
        assert!(aggregate_values(Aggregate::Max, &data, &mask[..2], &matching).is_err());
        assert!(aggregate_values(Aggregate::Max, &data, &mask, &matching[..1]).is_err());
    }

    #[test]
    fn test_aggregate_ignores_nan() {
        let data = [f64::NAN, 2.0, -4.0, f64::NAN, f64::NAN];
        let mask = [F; 5];
        let matching = [T, T, T, F, T];
        let max: Vec<_> = aggregate_values(Aggregate::Max, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert_eq!(max, vec![(1, 2.0)]);

        let max_abs: Vec<_> = aggregate_values(Aggregate::MaxAbs, &data, &mask, &matching)
            .unwrap()
            .collect();
        assert_eq!(max_abs, vec![(2, -4.0)]);
    }

    #[test]
    fn test_slices_to_array() {
        let out = slices_to_array(6, [(Some(1), Some(3)), (Some(4), None)]);
        assert_eq!(out, vec![F, T, T, F, T, T]);

        let out = slices_to_array(5, [(None, Some(-3)), (Some(3), Some(2)), (Some(10), None)]);
        assert_eq!(out, vec![T, T, F, F, F]);

        let out = slices_to_array(4, [(Some(-100), Some(100))]);
        assert_eq!(out, vec![T, T, T, T]);

        assert!(slices_to_array(0, [(None, None)]).is_empty());
    }
}
