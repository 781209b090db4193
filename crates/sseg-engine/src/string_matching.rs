// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Greedy agglomeration of adjacent repeated fragments by edit distance.
//!
//! Fragment nodes live in an arena addressed by stable ids (leaves first,
//! then one id per merge); the left-to-right order of surviving groups is a
//! separate `active` list that is spliced on every merge.

use crate::boundaries::find_boundaries;
use crate::labeling::{LabelMethod, STRING_LABEL_RATIO, label_segments};
use crate::options::SegmentOptions;
use crate::run_log::RunLog;
use sseg_core::{
    ExecutionContext, FragmentRecord, Matrix, SegError, Segmentation, SegmentationResult,
    SequenceOracle,
};
use sseg_linalg::{LinkageTree, Merge, edit_distance};

/// Fixed cut ratio used when no explicit threshold is given.
pub const STRING_CUT_RATIO: f64 = 0.1;

/// Fragments of an oracle resolved to frame spans and symbol strings.
///
/// `connectivity` is informational: its link count is reported in the run
/// notes, while merging only ever joins adjacent fragment groups.
#[derive(Clone, Debug, PartialEq)]
pub struct FragmentGraph {
    pub fragments: Vec<FragmentRecord>,
    /// Half-open observation spans; the last one always reaches the end.
    pub spans: Vec<(usize, usize)>,
    pub strings: Vec<Vec<usize>>,
    /// Recurrence links plus links between sequential neighbours.
    pub connectivity: Matrix,
}

impl FragmentGraph {
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of undirected fragment links.
    pub fn link_count(&self) -> usize {
        self.connectivity
            .as_slice()
            .iter()
            .filter(|&&v| v != 0.0)
            .count()
            / 2
    }
}

/// Resolves and validates the oracle's fragments.
pub fn fragment_graph(oracle: &dyn SequenceOracle) -> Result<FragmentGraph, SegError> {
    let fragments = oracle.fragments()?;
    let last_state = oracle.n_states().saturating_sub(1);
    let symbols = oracle.symbols();
    if symbols.len() != oracle.n_states() {
        return Err(SegError::invalid_oracle(format!(
            "oracle reports {} states but {} symbols",
            oracle.n_states(),
            symbols.len()
        )));
    }
    if fragments.is_empty() {
        return Err(SegError::invalid_oracle("oracle produced no fragments"));
    }

    let count = fragments.len();
    let mut spans = Vec::with_capacity(count);
    let mut strings = Vec::with_capacity(count);
    let mut expected_start = 1usize;
    for (idx, fragment) in fragments.iter().enumerate() {
        if fragment.len == 0 || fragment.end + 1 < fragment.len {
            return Err(SegError::invalid_oracle(format!(
                "fragment {idx} has invalid length {} ending at state {}",
                fragment.len, fragment.end
            )));
        }
        let start = fragment.start();
        if start != expected_start || fragment.end > last_state {
            return Err(SegError::invalid_oracle(format!(
                "fragment {idx} covers states {start}..={} but must start at {expected_start} within 1..={last_state}",
                fragment.end
            )));
        }
        let end = if idx + 1 == count {
            last_state
        } else {
            fragment.end
        };
        spans.push((start - 1, end));
        strings.push(symbols[start..=end].to_vec());
        expected_start = fragment.end + 1;
    }

    let mut connectivity = Matrix::zeros(count, count);
    for (idx, fragment) in fragments.iter().enumerate() {
        if let Some(source) = fragment.recurrence
            && source < count
            && source != idx
        {
            connectivity.set(idx, source, 1.0);
            connectivity.set(source, idx, 1.0);
        }
        if idx + 1 < count {
            connectivity.set(idx, idx + 1, 1.0);
            connectivity.set(idx + 1, idx, 1.0);
        }
    }

    Ok(FragmentGraph {
        fragments,
        spans,
        strings,
        connectivity,
    })
}

struct FragmentNode {
    symbols: Vec<usize>,
    leaves: usize,
}

/// Merges sequential neighbours with the smallest edit distance until one
/// group remains. Ties go to the leftmost pair.
pub fn merge_adjacent_fragments(strings: &[Vec<usize>]) -> Result<LinkageTree, SegError> {
    let count = strings.len();
    if count == 0 {
        return Err(SegError::invalid_input("fragment merging requires at least one fragment"));
    }
    let mut arena: Vec<FragmentNode> = strings
        .iter()
        .map(|symbols| FragmentNode {
            symbols: symbols.clone(),
            leaves: 1,
        })
        .collect();
    let mut active: Vec<usize> = (0..count).collect();
    let gap = |arena: &[FragmentNode], left: usize, right: usize| {
        edit_distance(&arena[left].symbols, &arena[right].symbols) as f64
    };
    let mut gaps: Vec<f64> = active
        .windows(2)
        .map(|pair| gap(&arena, pair[0], pair[1]))
        .collect();

    let mut merges = Vec::with_capacity(count - 1);
    while active.len() > 1 {
        let mut pos = 0;
        for (idx, &value) in gaps.iter().enumerate() {
            if value < gaps[pos] {
                pos = idx;
            }
        }
        let (left, right) = (active[pos], active[pos + 1]);
        let mut symbols = arena[left].symbols.clone();
        symbols.extend_from_slice(&arena[right].symbols);
        let leaves = arena[left].leaves + arena[right].leaves;
        let id = arena.len();
        arena.push(FragmentNode { symbols, leaves });
        merges.push(Merge {
            left,
            right,
            distance: gaps[pos],
            size: leaves,
        });

        active.splice(pos..pos + 2, [id]);
        gaps.remove(pos);
        if pos > 0 {
            gaps[pos - 1] = gap(&arena, active[pos - 1], id);
        }
        if pos + 1 < active.len() {
            gaps[pos] = gap(&arena, id, active[pos + 1]);
        }
    }

    LinkageTree::from_merges(count, merges)
}

/// Fragment string-matching segmentation.
pub fn segment_string_matching(
    oracle: &dyn SequenceOracle,
    data: &Matrix,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<SegmentationResult, SegError> {
    let n = data.rows();
    let graph = fragment_graph(oracle)?;
    let links = graph.link_count();
    ctx.record_scalar("engine.string.fragments", graph.len() as f64);
    ctx.report_progress(0.25);

    let tree = merge_adjacent_fragments(&graph.strings)?;
    let t = options
        .threshold
        .unwrap_or(STRING_CUT_RATIO * tree.max_distance());
    let fragment_labels = tree.fcluster(t, options.criterion)?;
    log.note(format!(
        "fragments={}, fragment_links={links}, cut_threshold={t:.6}",
        graph.len()
    ));
    ctx.report_progress(0.5);

    let mut frame_labels = Vec::with_capacity(n);
    for (&(start, end), &label) in graph.spans.iter().zip(&fragment_labels) {
        frame_labels.extend(std::iter::repeat_n(label, end - start));
    }
    if frame_labels.len() != n {
        return Err(SegError::invalid_oracle(format!(
            "fragments cover {} frames but the sequence has {n}",
            frame_labels.len()
        )));
    }

    let boundaries = find_boundaries(&frame_labels, options.width);
    let labels = label_segments(
        data,
        &boundaries,
        LabelMethod::Agglomerative {
            ratio: STRING_LABEL_RATIO,
        },
        options.n_init,
        options.seed,
        ctx,
        log,
    )?;
    ctx.report_progress(1.0);
    Ok(SegmentationResult::Single(Segmentation::new(
        n, boundaries, labels,
    )?))
}
