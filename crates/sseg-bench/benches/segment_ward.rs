// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use sseg_bench::block_oracle;
use sseg_core::SequenceOracle;
use sseg_engine::{OutputMode, SegmentOptions, segment};

fn bench_method(c: &mut Criterion, case_id: &str, method: &str, n: usize, mode: OutputMode) {
    let sequence = block_oracle(16, n / 16, 5);
    let options = SegmentOptions {
        mode,
        n_init: 10,
        seed: 42,
        ..SegmentOptions::default()
    };
    let oracle: &dyn SequenceOracle = &sequence;

    c.bench_function(case_id, |b| {
        b.iter(|| {
            segment(Some(black_box(oracle)), black_box(method), black_box(&options))
                .expect("ward benchmark segment should succeed");
        })
    });
}

fn benchmark_ward_n512(c: &mut Criterion) {
    bench_method(c, "symbol_agglomerative_n512", "symbol_agglomerative", 512, OutputMode::Single);
}

fn benchmark_ward_hierarchical_n512(c: &mut Criterion) {
    bench_method(
        c,
        "symbol_agglomerative_hierarchical_n512",
        "symbol_agglomerative",
        512,
        OutputMode::Hierarchical,
    );
}

fn benchmark_string_n512(c: &mut Criterion) {
    bench_method(c, "string_agglomerative_n512", "string_agglomerative", 512, OutputMode::Single);
}

criterion_group!(
    benches,
    benchmark_ward_n512,
    benchmark_ward_hierarchical_n512,
    benchmark_string_n512
);
criterion_main!(benches);
