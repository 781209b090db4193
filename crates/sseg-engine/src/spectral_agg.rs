// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::hierarchical::{agg_segment, distinct_count};
use crate::options::SegmentOptions;
use crate::run_log::RunLog;
use crate::spectral::laplacian_embedding;
use sseg_core::{ExecutionContext, Matrix, SegError, SegmentationResult};
use sseg_linalg::{Criterion, normalize_rows, ward_tree};

pub const SPECTRAL_AGG_CUT_RATIO: f64 = 0.75;

/// Eigen-embedding followed by an unconstrained ward cut.
pub fn segment_spectral_agg(
    connectivity: &Matrix,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<SegmentationResult, SegError> {
    let embedding = laplacian_embedding(connectivity, options.spectral_agg_rank, ctx, log)?;
    let mut x = embedding.vectors.transpose();
    normalize_rows(&mut x);
    ctx.report_progress(0.5);

    let tree = ward_tree(&x, None)?;
    let t = SPECTRAL_AGG_CUT_RATIO * tree.max_distance();
    let frame_labels = tree.fcluster(t, Criterion::Distance)?;
    log.note(format!(
        "rank={}, cut_threshold={t:.6}, clusters={}",
        embedding.rank(),
        distinct_count(&frame_labels)
    ));

    let segmentation = agg_segment(&frame_labels, options.width, &x, options, ctx, log)?;
    ctx.report_progress(1.0);
    Ok(SegmentationResult::Single(segmentation))
}
