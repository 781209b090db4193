// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::boundaries::find_boundaries;
use crate::labeling::{LabelMethod, label_segments};
use crate::options::SegmentOptions;
use crate::run_log::RunLog;
use sseg_core::{
    Degradation, ExecutionContext, HierarchyLevel, Matrix, SegError, Segmentation,
    SegmentationResult,
};
use sseg_linalg::{Criterion, LinkageTree, ward_tree};

/// Cut ratio of the single-level ward segmentation.
pub const WARD_CUT_RATIO: f64 = 0.7;
/// Cluster counts requested in hierarchical mode.
pub const HIERARCHY_ORDERS: std::ops::RangeInclusive<usize> = 2..=10;
const WIDTH_RELAX_STEP: usize = 3;

pub(crate) fn distinct_count(labels: &[usize]) -> usize {
    let mut seen = labels.to_vec();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

/// Turns per-frame cluster labels into a labeled segmentation.
///
/// Boundary smoothing is relaxed (window shrinks by 3 down to 1) until at
/// least `k + 1` boundaries exist for `k` distinct labels; the segments are
/// then labeled with k-means over their mean frames.
pub fn agg_segment(
    frame_labels: &[usize],
    width: usize,
    data: &Matrix,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<Segmentation, SegError> {
    let n = frame_labels.len();
    if data.rows() != n {
        return Err(SegError::invalid_input(format!(
            "data has {} rows but {n} frame labels were given",
            data.rows()
        )));
    }
    let k = distinct_count(frame_labels);
    let mut width = width.max(1);
    let mut boundaries = find_boundaries(frame_labels, width);
    while boundaries.len() < k + 1 && width > 1 {
        width = width.saturating_sub(WIDTH_RELAX_STEP).max(1);
        boundaries = find_boundaries(frame_labels, width);
    }
    if boundaries.len() < k + 1 {
        log.degrade(
            ctx,
            Degradation::BoundaryWindowExhausted {
                required: k + 1,
                found: boundaries.len(),
            },
        );
    }
    ctx.record_scalar("engine.agglomerative.final_width", width as f64);

    let labels = label_segments(
        data,
        &boundaries,
        LabelMethod::KMeans { k },
        options.n_init,
        options.seed,
        ctx,
        log,
    )?;
    Segmentation::new(n, boundaries, labels)
}

fn cut_levels(
    tree: &LinkageTree,
    data: &Matrix,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<Vec<HierarchyLevel>, SegError> {
    let total = HIERARCHY_ORDERS.clone().count();
    let mut levels = Vec::with_capacity(total);
    for (step, requested) in HIERARCHY_ORDERS.enumerate() {
        let frame_labels = tree.fcluster(requested as f64, Criterion::MaxClust)?;
        let segmentation = agg_segment(&frame_labels, options.width, data, options, ctx, log)?;
        levels.push(HierarchyLevel {
            requested,
            achieved: distinct_count(&frame_labels),
            segmentation,
        });
        ctx.report_progress((step + 1) as f32 / total as f32);
    }
    Ok(levels)
}

/// Constrained ward segmentation of the frames of `data`.
///
/// Merges are restricted to pairs linked in `connectivity`; disconnected
/// pieces are bridged at their closest frames.
pub fn segment_by_ward(
    data: &Matrix,
    connectivity: &Matrix,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<SegmentationResult, SegError> {
    let tree = ward_tree(data, Some(connectivity))?;
    ctx.record_scalar("engine.agglomerative.max_distance", tree.max_distance());

    if options.is_hierarchical() {
        let levels = cut_levels(&tree, data, options, ctx, log)?;
        log.note(format!("hierarchy_levels={}", levels.len()));
        return Ok(SegmentationResult::Hierarchical(levels));
    }

    let t = WARD_CUT_RATIO * tree.max_distance();
    let frame_labels = tree.fcluster(t, options.criterion)?;
    log.note(format!(
        "cut_threshold={t:.6}, clusters={}",
        distinct_count(&frame_labels)
    ));
    let segmentation = agg_segment(&frame_labels, options.width, data, options, ctx, log)?;
    ctx.report_progress(1.0);
    Ok(SegmentationResult::Single(segmentation))
}
