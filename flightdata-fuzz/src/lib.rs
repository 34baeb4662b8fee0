//! Fuzzing entry points for flightdata-core
//!
//! To use with cargo-fuzz:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_align

use flightdata_core::{
    packing::Unpack12Bit, repaired, runs, AlignerConfig, ByteAligner, MaskedArray, RepairOptions,
};

/// Align `data`, using its first byte to pick chunking and byte order
pub fn fuzz_align(data: &[u8]) {
    let Some((&control, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(control & 0x3F) + 1;
    let config = AlignerConfig::new()
        .little_endian(control & 0x40 == 0)
        .frames_only(control & 0x80 != 0);
    let Ok(mut aligner) = ByteAligner::new(config) else {
        return;
    };

    // Should never panic, and never emit more than it was given
    if let Ok(frames) = aligner.process(stream.chunks(chunk), None, None) {
        let emitted: usize = frames.map(|f| f.len()).sum();
        assert!(emitted <= stream.len());
    }
}

/// Unpack `data` as 12-bit words in irregular chunks
pub fn fuzz_unpack(data: &[u8]) {
    let chunk = data.first().map_or(1, |&b| usize::from(b % 7) + 1);
    let words: usize = Unpack12Bit::new(data.chunks(chunk), true)
        .map(|b| b.len() / 2)
        .sum();
    assert_eq!(words, data.len() / 3 * 2);
}

/// Repair a mask derived from `data`, then check run invariants
pub fn fuzz_repair(data: &[u8]) {
    let values: Vec<Option<f64>> = data
        .iter()
        .map(|&b| if b & 1 == 1 { None } else { Some(f64::from(b)) })
        .collect();
    let array = MaskedArray::from_options(&values, 0.0);
    let options = RepairOptions::new()
        .repair_duration(Some(f64::from(data.len() as u8 % 8)))
        .raise_entire_mask(false);
    if let Ok(out) = repaired(&array, &options) {
        assert!(out.masked_count() <= array.masked_count());
    }

    let mask: Vec<bool> = values.iter().map(Option::is_none).collect();
    let valid: Vec<bool> = mask.iter().map(|m| !m).collect();
    if let Ok(overlap) = runs::section_overlap(&mask, &valid) {
        assert!(overlap.iter().all(|&v| !v));
    }
}
