// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Laplacian eigen-embedding with entropy-based model-order selection.
//!
//! For every candidate order `n`, frames are embedded with the first `n`
//! eigenvectors of the normalized Laplacian, clustered with k-means and
//! scored by the entropy of the cluster sizes divided by its maximum. The
//! most balanced candidate wins; equal scores keep the smaller order.

use crate::boundaries::find_boundaries;
use crate::hierarchical::distinct_count;
use crate::labeling::{LabelMethod, label_segments};
use crate::options::SegmentOptions;
use crate::run_log::RunLog;
use sseg_core::{
    Degradation, ExecutionContext, HierarchyLevel, Matrix, SegError, Segmentation,
    SegmentationResult,
};
use sseg_linalg::{
    Embedding, KMeansConfig, entropy, kmeans, normalize_rows, normalized_laplacian,
    smallest_eigenvectors,
};

/// Candidate orders used in hierarchical mode.
pub const HIERARCHICAL_K_MIN: usize = 2;
pub const HIERARCHICAL_K_MAX: usize = 10;

/// Outcome of entropy-based order selection.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderSelection {
    /// Selected number of segment types (after boundary shrinking).
    pub order: usize,
    /// Normalized entropy of the selected candidate, in `[0, 1]`.
    pub score: f64,
    pub segmentation: Segmentation,
    /// Every evaluated candidate; only filled in hierarchical mode.
    pub candidates: Vec<HierarchyLevel>,
}

/// Frame-major embedding: first `n` eigenvectors as columns, rows normalized.
fn frame_embedding(embedding: &Embedding, n: usize) -> Matrix {
    let frames = embedding.vectors.cols();
    let mut out = Matrix::zeros(frames, n);
    for t in 0..frames {
        for i in 0..n {
            out.set(t, i, embedding.vectors.get(i, t));
        }
    }
    normalize_rows(&mut out);
    out
}

fn normalized_entropy(labels: &[usize], order: usize) -> f64 {
    let Some(&max_label) = labels.iter().max() else {
        return 0.0;
    };
    let mut hits = vec![0.0f64; max_label + 1];
    for &label in labels {
        hits[label] += 1.0;
    }
    let support = order.max(distinct_count(labels));
    if support <= 1 {
        return 0.0;
    }
    entropy(&hits) / (support as f64).ln()
}

/// Picks the number of segment types by normalized cluster-size entropy.
///
/// Candidates run from `k_min` to the embedding rank. When a candidate's
/// labels produce fewer than `n + 1` boundaries, `n` shrinks to the segment
/// count before scoring.
pub fn select_order(
    embedding: &Embedding,
    k_min: usize,
    hierarchical: bool,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<OrderSelection, SegError> {
    let frames = embedding.vectors.cols();
    let k_min = if hierarchical { HIERARCHICAL_K_MIN } else { k_min };
    let rank = embedding.rank();

    let mut best_score = f64::NEG_INFINITY;
    let mut best_boundaries = vec![0, frames];
    let mut best_order = 1usize;
    let mut best_embedding = frame_embedding(embedding, 1);
    let mut candidates = vec![];

    let total = rank.saturating_sub(k_min) + 1;
    for (step, requested) in (k_min..=rank).enumerate() {
        let y = frame_embedding(embedding, requested);
        let config = KMeansConfig {
            n_init: options.n_init,
            ..KMeansConfig::with_clusters(requested, options.seed)
        };
        let frame_labels = kmeans(&y, &config, ctx.repro_mode)?.labels;
        let boundaries = find_boundaries(&frame_labels, options.width);

        let mut order = requested;
        if boundaries.len() < order + 1 {
            order = boundaries.len() - 1;
        }
        let score = normalized_entropy(&frame_labels, order);
        log.note(format!("order={requested}, shrunk={order}, score={score:.6}"));

        if hierarchical {
            let labels = label_segments(
                &y,
                &boundaries,
                LabelMethod::KMeans { k: order },
                options.n_init,
                options.seed,
                ctx,
                log,
            )?;
            candidates.push(HierarchyLevel {
                requested,
                achieved: order,
                segmentation: Segmentation::new(frames, boundaries.clone(), labels)?,
            });
        }

        if score > best_score {
            best_score = score;
            best_boundaries = boundaries;
            best_order = order;
            best_embedding = y;
        }
        ctx.report_progress((step + 1) as f32 / total as f32);
    }

    let labels = label_segments(
        &best_embedding,
        &best_boundaries,
        LabelMethod::KMeans { k: best_order },
        options.n_init,
        options.seed,
        ctx,
        log,
    )?;
    let score = if best_score.is_finite() { best_score } else { 0.0 };
    ctx.record_scalar("engine.spectral.selected_order", best_order as f64);
    ctx.record_scalar("engine.spectral.selected_entropy", score);

    Ok(OrderSelection {
        order: best_order,
        score,
        segmentation: Segmentation::new(frames, best_boundaries, labels)?,
        candidates,
    })
}

/// Laplacian embedding of `connectivity` at `rank`, reporting rank shortfalls.
pub fn laplacian_embedding(
    connectivity: &Matrix,
    rank: usize,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<Embedding, SegError> {
    let laplacian = normalized_laplacian(connectivity)?;
    let embedding = smallest_eigenvectors(&laplacian, rank)?;
    if embedding.is_rank_reduced() {
        log.degrade(
            ctx,
            Degradation::EigenRankReduced {
                requested: embedding.requested,
                available: embedding.rank(),
            },
        );
    }
    Ok(embedding)
}

/// Spectral segmentation of a preprocessed connectivity matrix.
pub fn segment_spectral(
    connectivity: &Matrix,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<SegmentationResult, SegError> {
    let hierarchical = options.is_hierarchical();
    let k_max = if hierarchical {
        HIERARCHICAL_K_MAX
    } else {
        options.k_max
    };
    let embedding = laplacian_embedding(connectivity, k_max, ctx, log)?;
    let selection = select_order(&embedding, options.k_min, hierarchical, options, ctx, log)?;
    log.note(format!(
        "selected_order={}, selected_entropy={:.6}",
        selection.order, selection.score
    ));

    if hierarchical {
        let mut levels = selection.candidates;
        if levels.is_empty() {
            log.degrade(
                ctx,
                Degradation::HierarchyCollapsed {
                    rank: embedding.rank(),
                },
            );
            levels.push(HierarchyLevel {
                requested: selection.order,
                achieved: selection.order,
                segmentation: selection.segmentation,
            });
        }
        return Ok(SegmentationResult::Hierarchical(levels));
    }
    Ok(SegmentationResult::Single(selection.segmentation))
}
