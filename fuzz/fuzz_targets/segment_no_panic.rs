// SPDX-License-Identifier: MIT OR Apache-2.0

#![no_main]

#[path = "common.rs"]
mod common;

use libfuzzer_sys::fuzz_target;
use sseg_core::{Matrix, SymbolSequence, validate_boundaries};
use sseg_engine::{ConnectivitySource, OutputMode, SegmentOptions, segment};

const METHODS: [&str; 5] = [
    "symbol_agglomerative",
    "string_agglomerative",
    "symbol_spectral",
    "symbol_spectral_agglomerative",
    "unknown",
];

fn build_connectivity(
    seed: u8,
    n: usize,
    cursor: &mut common::ByteCursor<'_>,
) -> ConnectivitySource {
    match seed % 4 {
        0 => ConnectivitySource::Temporal,
        1 => ConnectivitySource::SelfSimilarity("symbol".to_string()),
        2 => ConnectivitySource::SelfSimilarity("rsfx".to_string()),
        _ => {
            let mut m = Matrix::zeros(n, n);
            for i in 0..n {
                for j in 0..n {
                    m.set(i, j, f64::from(cursor.next_u8()) / 255.0);
                }
            }
            ConnectivitySource::Matrix(m)
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut cursor = common::ByteCursor::new(data);
    let method = METHODS[usize::from(cursor.next_u8()) % METHODS.len()];
    let alphabet = common::bounded(cursor.next_u8(), 1, 6);
    let len = common::bounded(cursor.next_u8(), 0, 40);
    let symbols: Vec<usize> = (0..len)
        .map(|_| usize::from(cursor.next_u8()) % alphabet)
        .collect();
    let oracle = SymbolSequence::new(&symbols);

    let options = SegmentOptions {
        connectivity: build_connectivity(cursor.next_u8(), symbols.len(), &mut cursor),
        mode: if cursor.next_u8() & 1 == 0 {
            OutputMode::Single
        } else {
            OutputMode::Hierarchical
        },
        median_filter_width: 2 * common::bounded(cursor.next_u8(), 0, 6) + 1,
        width: common::bounded(cursor.next_u8(), 1, 12),
        k_min: common::bounded(cursor.next_u8(), 1, 6),
        k_max: common::bounded(cursor.next_u8(), 1, 10),
        n_init: common::bounded(cursor.next_u8(), 1, 4),
        seed: cursor.next_u64(),
        ..SegmentOptions::default()
    };

    let Ok(report) = segment(Some(&oracle), method, &options) else {
        return;
    };
    for seg in report.result.segmentations() {
        assert!(validate_boundaries(symbols.len(), &seg.boundaries).is_ok());
        assert_eq!(seg.labels.len() + 1, seg.boundaries.len());
    }
});
