//! Property-based tests using proptest

use flightdata_core::{
    kernels::{is_constant, is_constant_u16, is_constant_u8},
    packing::{pack_12bit, unpack_12bit, unpack_12bit_to_bytes, Unpack12Bit},
    repaired,
    runs::{contract_runs_to_vec, longest_run, nearest_idx, remove_small_runs_to_vec, section_overlap},
    AlignerConfig, ByteAligner, MaskedArray, RepairMethod, RepairOptions,
};
use proptest::prelude::*;

fn method() -> impl Strategy<Value = RepairMethod> {
    prop_oneof![
        Just(RepairMethod::Interpolate),
        Just(RepairMethod::FillStart),
        Just(RepairMethod::FillStop),
    ]
}

proptest! {
    #[test]
    fn prop_nearest_idx_is_closest(
        array in prop::collection::vec(any::<bool>(), 1..64),
        seed in any::<usize>()
    ) {
        let i = seed % array.len();
        let expected = if array[i] {
            Some(i)
        } else {
            // smallest distance, larger index on ties
            (0..array.len())
                .filter(|&j| array[j])
                .min_by_key(|&j| (j.abs_diff(i), usize::MAX - j))
        };
        prop_assert_eq!(nearest_idx(&array, i as isize, true, None, None), expected);
    }

    #[test]
    fn prop_contract_runs_bounds(
        array in prop::collection::vec(any::<bool>(), 0..128),
        matching in any::<bool>()
    ) {
        prop_assert_eq!(contract_runs_to_vec(&array, 0, matching), array.clone());
        let wiped = contract_runs_to_vec(&array, array.len().max(1), matching);
        prop_assert!(wiped.iter().all(|&v| v != matching));
    }

    #[test]
    fn prop_remove_small_runs_zero_seconds(
        array in prop::collection::vec(any::<bool>(), 0..128),
        hz in 0.01f64..64.0,
        matching in any::<bool>()
    ) {
        prop_assert_eq!(remove_small_runs_to_vec(&array, 0.0, hz, matching), array);
    }

    #[test]
    fn prop_section_overlap_symmetric(
        pairs in prop::collection::vec(any::<(bool, bool)>(), 0..128)
    ) {
        let (a, b): (Vec<bool>, Vec<bool>) = pairs.into_iter().unzip();
        let ab = section_overlap(&a, &b).unwrap();
        let ba = section_overlap(&b, &a).unwrap();
        prop_assert_eq!(&ab, &ba);
        for i in 0..a.len() {
            if a[i] && b[i] {
                prop_assert!(ab[i]);
            }
            if ab[i] {
                prop_assert!(a[i] || b[i]);
            }
        }
    }

    #[test]
    fn prop_repair_without_mask_is_identity(
        data in prop::collection::vec(-1e6f64..1e6, 0..64),
        method in method()
    ) {
        let array = MaskedArray::new(data.clone(), vec![false; data.len()]).unwrap();
        let options = RepairOptions::new().method(method).extrapolate(true);
        prop_assert_eq!(repaired(&array, &options).unwrap(), array);
    }

    #[test]
    fn prop_repair_idempotent(
        samples in prop::collection::vec(prop::option::of(-1e6f64..1e6), 1..64),
        method in method(),
        extrapolate in any::<bool>(),
        duration in prop::option::of(0.0f64..8.0)
    ) {
        let array = MaskedArray::from_options(&samples, 0.0);
        let options = RepairOptions::new()
            .method(method)
            .extrapolate(extrapolate)
            .repair_duration(duration)
            .raise_entire_mask(false);
        let once = repaired(&array, &options).unwrap();
        let twice = repaired(&once, &options).unwrap();
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.masked_count() <= array.masked_count());
    }

    #[test]
    fn prop_repair_respects_limit(
        samples in prop::collection::vec(prop::option::of(0u16..4096), 1..64),
        duration in 1.0f64..8.0
    ) {
        let array = MaskedArray::from_options(&samples, 0);
        let options = RepairOptions::new()
            .repair_duration(Some(duration))
            .raise_entire_mask(false);
        let out = repaired(&array, &options).unwrap();
        // an interior gap stays masked only when its span between valid
        // endpoints exceeds the limit
        let mask = out.mask().unwrap();
        if out.masked_count() > 0 {
            prop_assert!(longest_run(mask, true) as f64 + 1.0 > duration || mask[0] || mask[mask.len() - 1]);
        }
    }

    #[test]
    fn prop_constant_fast_paths_agree(
        bytes in prop::collection::vec(0u8..2, 0..100),
        words in prop::collection::vec(0u16..2, 0..100)
    ) {
        prop_assert_eq!(is_constant_u8(&bytes), is_constant(&bytes));
        prop_assert_eq!(is_constant_u16(&words), is_constant(&words));
    }

    #[test]
    fn prop_pack_keeps_low_12_bits(
        words in prop::collection::vec(any::<u16>(), 0..256)
    ) {
        let unpacked = unpack_12bit(&pack_12bit(&words));
        prop_assert_eq!(unpacked.len(), words.len().div_ceil(2) * 2);
        for (a, b) in words.iter().zip(&unpacked) {
            prop_assert_eq!(a & 0x0FFF, *b);
        }
    }

    #[test]
    fn prop_streaming_unpack_matches_whole(
        packed in prop::collection::vec(any::<u8>(), 0..512),
        chunk in 1usize..17
    ) {
        let whole = unpack_12bit_to_bytes(&packed, true);
        let streamed: Vec<u8> = Unpack12Bit::new(packed.chunks(chunk), true)
            .flat_map(|b| b.to_vec())
            .collect();
        prop_assert_eq!(streamed, whole.to_vec());
    }

    #[test]
    fn prop_aligner_never_panics(
        data in prop::collection::vec(any::<u8>(), 0..8192),
        chunk in 1usize..1024,
        frames_only in any::<bool>()
    ) {
        let config = AlignerConfig::new().frames_only(frames_only);
        let mut aligner = ByteAligner::new(config).unwrap();
        let out: usize = aligner
            .process(data.chunks(chunk), None, None)
            .unwrap()
            .map(|b| b.len())
            .sum();
        prop_assert!(out <= data.len());
        prop_assert_eq!(aligner.buffered(), 0);
    }
}
