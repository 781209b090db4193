// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Segmentation, SymbolSequence};
use sseg_engine::{SegmentOptions, segment};
use sseg_eval::structure_metrics;

#[test]
fn alternating_sequence_matches_its_ground_truth() {
    let oracle = SymbolSequence::new(&[0, 1, 0, 1, 0, 1, 0, 1]);
    let report = segment(Some(&oracle), "symbol_agglomerative", &SegmentOptions::default())
        .expect("valid oracle");
    let detected = report.result.as_single().expect("single mode");
    let truth = Segmentation::new(
        8,
        (0..=8).collect(),
        vec![5, 7, 5, 7, 5, 7, 5, 7],
    )
    .expect("valid reference");

    let metrics = structure_metrics(detected, &truth, 0).expect("same length");
    assert_eq!(metrics.boundary.f1, 1.0);
    assert_eq!(metrics.pairwise.f1, 1.0);
    assert_eq!(metrics.rand_index, 1.0);
}

#[test]
fn metrics_stay_in_unit_range_for_every_method() {
    let symbols: Vec<usize> = [0usize, 1, 2, 1]
        .iter()
        .flat_map(|&s| std::iter::repeat_n(s, 6))
        .collect();
    let oracle = SymbolSequence::new(&symbols);
    let truth = Segmentation::new(24, vec![0, 6, 12, 18, 24], vec![0, 1, 2, 1])
        .expect("valid reference");
    let options = SegmentOptions {
        n_init: 10,
        ..SegmentOptions::default()
    };
    for method in [
        "symbol_agglomerative",
        "string_agglomerative",
        "symbol_spectral",
        "symbol_spectral_agglomerative",
    ] {
        let report = segment(Some(&oracle), method, &options).expect("valid oracle");
        let detected = report.result.as_single().expect("single mode");
        let metrics = structure_metrics(detected, &truth, 2).expect("same length");
        for value in [
            metrics.boundary.f1,
            metrics.pairwise.f1,
            metrics.rand_index,
        ] {
            assert!((0.0..=1.0).contains(&value), "{method}: {value}");
        }
    }
}
