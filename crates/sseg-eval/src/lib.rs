// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Agreement metrics between a detected and a reference segmentation.

use sseg_core::{SegError, Segmentation, validate_boundaries};
use std::collections::HashMap;

/// Precision/recall/F1 summary.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct F1Metrics {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl F1Metrics {
    fn from_counts(true_positives: usize, detected: usize, truth: usize) -> Self {
        let false_positives = detected - true_positives;
        let false_negatives = truth - true_positives;
        if detected == 0 && truth == 0 {
            return Self {
                true_positives,
                false_positives,
                false_negatives,
                precision: 1.0,
                recall: 1.0,
                f1: 1.0,
            };
        }
        let precision = ratio(true_positives, detected);
        let recall = ratio(true_positives, truth);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            true_positives,
            false_positives,
            false_negatives,
            precision,
            recall,
            f1,
        }
    }
}

/// Boundary, pairwise-label and Rand agreement in one report.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct StructureMetrics {
    pub boundary: F1Metrics,
    pub pairwise: F1Metrics,
    pub rand_index: f64,
}

/// Computes every metric of [`StructureMetrics`].
pub fn structure_metrics(
    detected: &Segmentation,
    truth: &Segmentation,
    tolerance: usize,
) -> Result<StructureMetrics, SegError> {
    Ok(StructureMetrics {
        boundary: boundary_f_measure(detected, truth, tolerance)?,
        pairwise: pairwise_f_measure(detected, truth)?,
        rand_index: rand_index(detected, truth)?,
    })
}

/// Expands segment labels to one label per frame.
pub fn frame_labels(segmentation: &Segmentation) -> Vec<usize> {
    segmentation.frame_labels()
}

/// Boundary hit rate with one-to-one matching within `tolerance` frames.
///
/// Only internal boundaries count; the sequence start and end are implied.
pub fn boundary_f_measure(
    detected: &Segmentation,
    truth: &Segmentation,
    tolerance: usize,
) -> Result<F1Metrics, SegError> {
    validate_pair(detected, truth)?;
    let detected_b = internal_boundaries(detected);
    let truth_b = internal_boundaries(truth);
    let hits = count_tolerance_matches(detected_b, truth_b, tolerance);
    Ok(F1Metrics::from_counts(hits, detected_b.len(), truth_b.len()))
}

/// Frame-pair F-measure: a pair is positive when both frames share a label.
pub fn pairwise_f_measure(
    detected: &Segmentation,
    truth: &Segmentation,
) -> Result<F1Metrics, SegError> {
    let counts = PairCounts::new(detected, truth)?;
    let as_count = |value: u128| usize::try_from(value).unwrap_or(usize::MAX);
    Ok(F1Metrics::from_counts(
        as_count(counts.same_both),
        as_count(counts.same_detected),
        as_count(counts.same_truth),
    ))
}

/// Fraction of frame pairs on whose co-membership both segmentations agree.
pub fn rand_index(detected: &Segmentation, truth: &Segmentation) -> Result<f64, SegError> {
    let counts = PairCounts::new(detected, truth)?;
    if counts.total == 0 {
        return Ok(1.0);
    }
    let disagreements = counts.same_truth + counts.same_detected - 2 * counts.same_both;
    Ok(1.0 - disagreements as f64 / counts.total as f64)
}

struct PairCounts {
    total: u128,
    same_detected: u128,
    same_truth: u128,
    same_both: u128,
}

impl PairCounts {
    fn new(detected: &Segmentation, truth: &Segmentation) -> Result<Self, SegError> {
        let n = validate_pair(detected, truth)?;
        let detected_frames = detected.frame_labels();
        let truth_frames = truth.frame_labels();

        let mut detected_sizes: HashMap<usize, usize> = HashMap::new();
        let mut truth_sizes: HashMap<usize, usize> = HashMap::new();
        let mut joint_sizes: HashMap<(usize, usize), usize> = HashMap::new();
        for (&d, &t) in detected_frames.iter().zip(&truth_frames) {
            *detected_sizes.entry(d).or_default() += 1;
            *truth_sizes.entry(t).or_default() += 1;
            *joint_sizes.entry((d, t)).or_default() += 1;
        }

        Ok(Self {
            total: choose2(n),
            same_detected: detected_sizes.values().map(|&c| choose2(c)).sum(),
            same_truth: truth_sizes.values().map(|&c| choose2(c)).sum(),
            same_both: joint_sizes.values().map(|&c| choose2(c)).sum(),
        })
    }
}

fn validate_pair(detected: &Segmentation, truth: &Segmentation) -> Result<usize, SegError> {
    let detected_n = validate_segmentation(detected, "detected")?;
    let truth_n = validate_segmentation(truth, "reference")?;
    if detected_n != truth_n {
        return Err(SegError::invalid_input(format!(
            "detected and reference segmentations must share n; got detected_n={detected_n}, reference_n={truth_n}"
        )));
    }
    Ok(truth_n)
}

fn validate_segmentation(segmentation: &Segmentation, label: &str) -> Result<usize, SegError> {
    let n = segmentation.len();
    validate_boundaries(n, &segmentation.boundaries)
        .map_err(|err| SegError::invalid_input(format!("{label} segmentation is invalid: {err}")))?;
    if segmentation.labels.len() + 1 != segmentation.boundaries.len() {
        return Err(SegError::invalid_input(format!(
            "{label} segmentation has {} labels for {} boundaries",
            segmentation.labels.len(),
            segmentation.boundaries.len()
        )));
    }
    Ok(n)
}

fn internal_boundaries(segmentation: &Segmentation) -> &[usize] {
    let b = segmentation.boundaries.as_slice();
    if b.len() < 2 { &[] } else { &b[1..b.len() - 1] }
}

fn count_tolerance_matches(detected: &[usize], truth: &[usize], tolerance: usize) -> usize {
    let mut i = 0usize;
    let mut j = 0usize;
    let mut matches = 0usize;

    while i < detected.len() && j < truth.len() {
        let d = detected[i];
        let t = truth[j];
        if d.abs_diff(t) <= tolerance {
            matches += 1;
            i += 1;
            j += 1;
            continue;
        }
        if d < t {
            i += 1;
        } else {
            j += 1;
        }
    }

    matches
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn choose2(value: usize) -> u128 {
    if value < 2 {
        0
    } else {
        let value = value as u128;
        value * (value - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::{
        boundary_f_measure, frame_labels, pairwise_f_measure, rand_index, structure_metrics,
    };
    use sseg_core::{SegError, Segmentation};

    fn seg(n: usize, boundaries: &[usize], labels: &[usize]) -> Segmentation {
        Segmentation::new(n, boundaries.to_vec(), labels.to_vec())
            .expect("test segmentation should be valid")
    }

    fn assert_approx_eq(actual: f64, expected: f64) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-12,
            "expected {expected}, got {actual} (delta={delta})"
        );
    }

    #[test]
    fn boundary_matching_respects_tolerance() {
        let detected = seg(100, &[0, 18, 52, 77, 100], &[0, 1, 2, 0]);
        let truth = seg(100, &[0, 20, 50, 80, 100], &[0, 1, 2, 0]);

        let loose = boundary_f_measure(&detected, &truth, 3).expect("same length");
        assert_eq!(loose.true_positives, 3);
        assert_approx_eq(loose.f1, 1.0);

        let tight = boundary_f_measure(&detected, &truth, 1).expect("same length");
        assert_eq!(tight.true_positives, 0);
        assert_eq!(tight.false_positives, 3);
        assert_eq!(tight.false_negatives, 3);
        assert_approx_eq(tight.f1, 0.0);
    }

    #[test]
    fn single_segment_pair_scores_perfectly() {
        let a = seg(5, &[0, 5], &[0]);
        let metrics = boundary_f_measure(&a, &a, 0).expect("same length");
        assert_approx_eq(metrics.precision, 1.0);
        assert_approx_eq(metrics.recall, 1.0);
    }

    #[test]
    fn pairwise_measure_counts_shared_label_pairs() {
        let detected = seg(4, &[0, 2, 4], &[0, 1]);
        let truth = seg(4, &[0, 4], &[0]);
        let metrics = pairwise_f_measure(&detected, &truth).expect("same length");
        assert_approx_eq(metrics.precision, 1.0);
        assert_approx_eq(metrics.recall, 1.0 / 3.0);
        assert_approx_eq(metrics.f1, 0.5);
    }

    #[test]
    fn repeated_labels_count_across_segments() {
        let detected = seg(6, &[0, 2, 4, 6], &[0, 1, 0]);
        let truth = seg(6, &[0, 2, 4, 6], &[3, 4, 3]);
        let metrics = pairwise_f_measure(&detected, &truth).expect("same length");
        assert_approx_eq(metrics.f1, 1.0);
        assert_approx_eq(rand_index(&detected, &truth).expect("same length"), 1.0);
    }

    #[test]
    fn rand_index_matches_hand_computed_values() {
        let detected = seg(8, &[0, 5, 8], &[0, 1]);
        let truth = seg(8, &[0, 3, 8], &[0, 1]);
        assert_approx_eq(rand_index(&detected, &truth).expect("same length"), 4.0 / 7.0);

        let split = seg(4, &[0, 2, 4], &[0, 1]);
        let whole = seg(4, &[0, 4], &[0]);
        assert_approx_eq(rand_index(&split, &whole).expect("same length"), 1.0 / 3.0);
    }

    #[test]
    fn rand_index_is_one_for_single_frame() {
        let a = seg(1, &[0, 1], &[0]);
        assert_approx_eq(rand_index(&a, &a).expect("same length"), 1.0);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let a = seg(4, &[0, 4], &[0]);
        let b = seg(5, &[0, 5], &[0]);
        let err = structure_metrics(&a, &b, 1).expect_err("different lengths");
        assert!(matches!(err, SegError::InvalidInput(_)));
        assert!(err.to_string().contains("must share n"));
    }

    #[test]
    fn malformed_segmentation_is_rejected() {
        let good = seg(4, &[0, 4], &[0]);
        let bad = Segmentation {
            boundaries: vec![0, 2, 4],
            labels: vec![0],
        };
        let err = pairwise_f_measure(&bad, &good).expect_err("label count mismatch");
        assert!(matches!(err, SegError::InvalidInput(_)));
    }

    #[test]
    fn frame_labels_expand_segments() {
        let s = seg(5, &[0, 2, 5], &[1, 0]);
        assert_eq!(frame_labels(&s), vec![1, 1, 0, 0, 0]);
    }
}
