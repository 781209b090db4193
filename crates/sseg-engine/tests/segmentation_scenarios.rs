// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{
    Degradation, ExecutionContext, Matrix, ReproMode, SegError, SegmentationResult,
    SymbolSequence, TelemetrySink, validate_boundaries,
};
use sseg_engine::spectral::laplacian_embedding;
use sseg_engine::{
    ConnectivitySource, OutputMode, RunLog, SegmentOptions, SegmentationMethod,
    merge_adjacent_fragments, segment, segment_with_context, select_order,
};
use std::sync::Mutex;

#[derive(Default)]
struct RecordingSink {
    scalars: Mutex<Vec<(&'static str, f64)>>,
    events: Mutex<Vec<Degradation>>,
}

impl TelemetrySink for RecordingSink {
    fn record_scalar(&self, key: &'static str, value: f64) {
        self.scalars
            .lock()
            .expect("scalar mutex should lock")
            .push((key, value));
    }

    fn on_degradation(&self, event: &Degradation) {
        self.events
            .lock()
            .expect("event mutex should lock")
            .push(event.clone());
    }
}

fn blocks(pattern: &[(usize, usize)]) -> Vec<usize> {
    pattern
        .iter()
        .flat_map(|&(symbol, len)| std::iter::repeat_n(symbol, len))
        .collect()
}

fn weakly_linked_blocks(block: usize, count: usize) -> Matrix {
    let n = block * count;
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            if i != j && i / block == j / block {
                m.set(i, j, 1.0);
            }
        }
    }
    for edge in (block..n).step_by(block) {
        m.set(edge - 1, edge, 0.05);
        m.set(edge, edge - 1, 0.05);
    }
    m
}

fn assert_contract(result: &SegmentationResult, n: usize) {
    for seg in result.segmentations() {
        validate_boundaries(n, &seg.boundaries).expect("boundary contract");
        assert_eq!(seg.labels.len() + 1, seg.boundaries.len());
    }
}

#[test]
fn alternating_symbols_are_not_merged_into_one_segment() {
    let oracle = SymbolSequence::new(&[0, 1, 0, 1, 0, 1, 0, 1]);
    let report = segment(Some(&oracle), "symbol_agglomerative", &SegmentOptions::default())
        .expect("valid oracle");
    let seg = report.result.as_single().expect("single mode");
    assert!(seg.segment_count() > 1);
    assert_eq!(seg.label_count(), 2);
    assert_eq!(seg.frame_labels(), vec![0, 1, 0, 1, 0, 1, 0, 1]);
    assert_eq!(report.diagnostics.method, "symbol_agglomerative");
}

#[test]
fn two_state_oracle_yields_one_segment_for_every_method() {
    let oracle = SymbolSequence::new(&[0]);
    for method in SegmentationMethod::ALL {
        let report = segment(Some(&oracle), method.as_str(), &SegmentOptions::default())
            .unwrap_or_else(|err| panic!("{} failed: {err}", method.as_str()));
        let seg = report.result.as_single().expect("single mode");
        assert_eq!(seg.boundaries, vec![0, 1], "{}", method.as_str());
        assert_eq!(seg.labels.len(), 1, "{}", method.as_str());
    }
}

#[test]
fn absent_or_empty_oracle_is_rejected() {
    let err = segment(None, "symbol_spectral", &SegmentOptions::default())
        .expect_err("missing oracle");
    assert!(matches!(err, SegError::InvalidOracle(_)));

    let empty = SymbolSequence::new(&[]);
    let err = segment(Some(&empty), "symbol_spectral", &SegmentOptions::default())
        .expect_err("no observations");
    assert!(matches!(err, SegError::InvalidOracle(_)));
}

#[test]
fn unknown_method_falls_back_to_spectral_with_event() {
    let symbols = blocks(&[(0, 8), (1, 8), (0, 8)]);
    let oracle = SymbolSequence::new(&symbols);
    let sink = RecordingSink::default();
    let ctx = ExecutionContext::new()
        .with_repro_mode(ReproMode::Strict)
        .with_telemetry_sink(&sink);
    let report = segment_with_context(Some(&oracle), "foo", &SegmentOptions::default(), &ctx)
        .expect("fallback keeps running");

    assert_eq!(report.diagnostics.method, "symbol_spectral");
    assert!(report.diagnostics.is_degraded());
    assert_eq!(
        report.diagnostics.degradations[0],
        Degradation::UnknownMethod {
            requested: "foo".to_string()
        }
    );
    assert!(report.diagnostics.warnings[0].contains("'foo'"));
    assert_contract(&report.result, symbols.len());

    let events = sink.events.lock().expect("events should lock");
    assert_eq!(events[0].kind(), "unknown_method");
    let scalars = sink.scalars.lock().expect("scalars should lock");
    assert!(scalars.iter().any(|(key, _)| *key == "engine.spectral.selected_order"));
}

#[test]
fn entropy_selection_finds_three_balanced_blocks() {
    let ctx = ExecutionContext::new();
    let mut log = RunLog::default();
    let connectivity = weakly_linked_blocks(10, 3);
    let embedding = laplacian_embedding(&connectivity, 4, &ctx, &mut log).expect("embedding");
    let options = SegmentOptions {
        k_min: 2,
        k_max: 4,
        ..SegmentOptions::default()
    };
    let selection =
        select_order(&embedding, 2, false, &options, &ctx, &mut log).expect("selection");

    assert_eq!(selection.order, 3);
    assert!((selection.score - 1.0).abs() < 1e-9, "{}", selection.score);
    assert_eq!(selection.segmentation.boundaries, vec![0, 10, 20, 30]);
    assert_eq!(selection.segmentation.label_count(), 3);
    assert!(selection.candidates.is_empty());
}

#[test]
fn adjacent_fragment_merging_takes_the_middle_pair_first() {
    let strings = vec![vec![0; 5], vec![1; 5], vec![1, 1, 1, 1, 2], vec![3; 5]];
    let tree = merge_adjacent_fragments(&strings).expect("four fragments");
    assert_eq!((tree.merges[0].left, tree.merges[0].right), (1, 2));
    assert_eq!(tree.merges[0].distance, 1.0);
}

#[test]
fn hierarchical_ward_returns_nine_levels() {
    let symbols = blocks(&[(0, 6), (1, 6), (2, 6), (0, 6), (1, 6), (3, 6)]);
    let oracle = SymbolSequence::new(&symbols);
    let options = SegmentOptions {
        mode: OutputMode::Hierarchical,
        n_init: 20,
        ..SegmentOptions::default()
    };
    let report = segment(Some(&oracle), "symbol_agglomerative", &options).expect("valid oracle");
    let levels = report.result.levels();
    assert_eq!(levels.len(), 9);
    for pair in levels.windows(2) {
        assert!(pair[0].achieved <= pair[1].achieved);
    }
    assert_contract(&report.result, symbols.len());
}

#[test]
fn string_matching_segments_repeated_material() {
    let symbols = blocks(&[(0, 3), (1, 3), (2, 3), (0, 3), (1, 3), (2, 3), (3, 4)]);
    let oracle = SymbolSequence::new(&symbols);
    let report = segment(Some(&oracle), "string_agglomerative", &SegmentOptions::default())
        .expect("valid oracle");
    assert_contract(&report.result, symbols.len());
    assert!(
        report
            .diagnostics
            .notes
            .iter()
            .any(|note| note.starts_with("fragments="))
    );
}

#[test]
fn spectral_methods_accept_self_similarity_connectivity() {
    let symbols = blocks(&[(0, 10), (1, 10), (0, 10), (1, 10)]);
    let oracle = SymbolSequence::new(&symbols);
    let options = SegmentOptions {
        connectivity: ConnectivitySource::SelfSimilarity("symbol".to_string()),
        n_init: 20,
        ..SegmentOptions::default()
    };
    for method in ["symbol_spectral", "symbol_spectral_agglomerative"] {
        let report = segment(Some(&oracle), method, &options).expect("valid oracle");
        assert_contract(&report.result, symbols.len());
        assert_eq!(report.diagnostics.n, symbols.len());
        assert_eq!(report.diagnostics.seed, Some(0));
    }
}

#[test]
fn spectral_hierarchical_mode_reports_candidates() {
    let symbols = blocks(&[(0, 8), (1, 8), (2, 8), (1, 8)]);
    let oracle = SymbolSequence::new(&symbols);
    let options = SegmentOptions {
        mode: OutputMode::Hierarchical,
        n_init: 10,
        ..SegmentOptions::default()
    };
    let report = segment(Some(&oracle), "symbol_spectral", &options).expect("valid oracle");
    assert_eq!(report.result.levels().len(), 9);
    assert_contract(&report.result, symbols.len());
}

#[test]
fn spectral_hierarchy_on_two_frames_returns_one_level() {
    let options = SegmentOptions {
        mode: OutputMode::Hierarchical,
        ..SegmentOptions::default()
    };
    for observations in [[0, 1], [0, 0]] {
        let oracle = SymbolSequence::new(&observations);
        let report = segment(Some(&oracle), "symbol_spectral", &options).expect("valid oracle");
        let levels = report.result.levels();
        assert_eq!(levels.len(), 1, "{observations:?}");
        assert_eq!(levels[0].achieved, 1);
        assert_eq!(levels[0].segmentation.labels, vec![0]);
        assert_contract(&report.result, observations.len());
        assert!(
            report
                .diagnostics
                .degradations
                .iter()
                .any(|event| event.kind() == "hierarchy_collapsed")
        );
        assert!(!report.diagnostics.warnings.is_empty());
    }
}

#[test]
fn same_seed_gives_identical_reports() {
    let symbols = blocks(&[(0, 7), (1, 5), (0, 7), (2, 5)]);
    let oracle = SymbolSequence::new(&symbols);
    let options = SegmentOptions {
        seed: 42,
        n_init: 10,
        ..SegmentOptions::default()
    };
    let first = segment(Some(&oracle), "symbol_spectral", &options).expect("first run");
    let second = segment(Some(&oracle), "symbol_spectral", &options).expect("second run");
    assert_eq!(first.result, second.result);
}

#[test]
fn invalid_options_are_rejected_before_running() {
    let oracle = SymbolSequence::new(&[0, 1, 0]);
    let options = SegmentOptions {
        median_filter_width: 8,
        ..SegmentOptions::default()
    };
    let err = segment(Some(&oracle), "symbol_spectral", &options).expect_err("even width");
    assert!(matches!(err, SegError::InvalidInput(_)));
}
