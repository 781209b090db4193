// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Structural segmentation of symbolic sequence models.
//!
//! [`segment`] turns a [`SequenceOracle`] into segment boundaries and
//! repeated-structure labels with one of four strategies.

pub mod boundaries;
pub mod connectivity;
pub mod hierarchical;
pub mod labeling;
pub mod options;
pub mod pipeline;
pub mod run_log;
pub mod segmenter;
pub mod spectral;
pub mod spectral_agg;
pub mod string_matching;

pub use boundaries::find_boundaries;
pub use connectivity::preprocess_connectivity;
pub use hierarchical::{agg_segment, segment_by_ward};
pub use labeling::{LabelMethod, label_segments};
pub use options::{ConnectivitySource, DataRepresentation, OutputMode, SegmentOptions};
pub use pipeline::{ClusterMethod, segment_by_connectivity, segment_single_frame};
pub use run_log::RunLog;
pub use segmenter::{SegmentationMethod, Segmenter};
pub use spectral::{OrderSelection, segment_spectral, select_order};
pub use spectral_agg::segment_spectral_agg;
pub use string_matching::{FragmentGraph, fragment_graph, merge_adjacent_fragments};

pub use sseg_core::{
    Degradation, Diagnostics, ExecutionContext, HierarchyLevel, SegError, Segmentation,
    SegmentationReport, SegmentationResult, SequenceOracle,
};
pub use sseg_linalg::Criterion;

use std::borrow::Cow;
use std::time::Instant;

/// Segments `oracle` with the named method and default execution context.
pub fn segment(
    oracle: Option<&dyn SequenceOracle>,
    method: &str,
    options: &SegmentOptions,
) -> Result<SegmentationReport, SegError> {
    segment_with_context(oracle, method, options, &ExecutionContext::new())
}

/// Segments `oracle` with the named method.
///
/// Unknown method names fall back to `symbol_spectral`; the fallback is
/// reported as a warning and a [`Degradation::UnknownMethod`] event.
pub fn segment_with_context(
    oracle: Option<&dyn SequenceOracle>,
    method: &str,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
) -> Result<SegmentationReport, SegError> {
    let Some(oracle) = oracle else {
        return Err(SegError::invalid_oracle("oracle is absent"));
    };
    let n = oracle.observation_count();
    if n == 0 {
        return Err(SegError::invalid_oracle(format!(
            "oracle has no observations (n_states={})",
            oracle.n_states()
        )));
    }
    options.validate()?;

    let started_at = Instant::now();
    let mut log = RunLog::default();
    let resolved = match SegmentationMethod::parse(method) {
        Some(resolved) => resolved,
        None => {
            log.degrade(
                ctx,
                Degradation::UnknownMethod {
                    requested: method.to_string(),
                },
            );
            SegmentationMethod::SymbolSpectral
        }
    };

    let strategy: &dyn Segmenter = match resolved {
        SegmentationMethod::SymbolAgglomerative => &segmenter::SymbolAgglomerative,
        SegmentationMethod::StringAgglomerative => &segmenter::StringAgglomerative,
        SegmentationMethod::SymbolSpectral => &segmenter::SymbolSpectral,
        SegmentationMethod::SymbolSpectralAgglomerative => {
            &segmenter::SymbolSpectralAgglomerative
        }
    };
    let result = strategy.segment(oracle, options, ctx, &mut log)?;

    let runtime_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);
    ctx.record_scalar("engine.runtime_ms", runtime_ms as f64);
    ctx.report_progress(1.0);

    let diagnostics = Diagnostics {
        n,
        runtime_ms: Some(runtime_ms),
        notes: log.notes,
        warnings: log.warnings,
        method: Cow::Borrowed(resolved.as_str()),
        seed: Some(options.seed),
        repro_mode: ctx.repro_mode,
        degradations: log.degradations,
        #[cfg(feature = "serde")]
        params_json: serde_json::to_value(options).ok(),
        ..Diagnostics::default()
    };
    Ok(SegmentationReport {
        result,
        diagnostics,
    })
}
