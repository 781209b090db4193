// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{Diagnostics, SegError};

/// Validates the boundary contract for a sequence of length `n`.
///
/// Boundaries must start at 0, end at `n` and be strictly increasing.
pub fn validate_boundaries(n: usize, boundaries: &[usize]) -> Result<(), SegError> {
    if boundaries.len() < 2 {
        return Err(SegError::invalid_input(format!(
            "boundaries must contain at least [0, n]; got {} entries",
            boundaries.len()
        )));
    }
    if boundaries[0] != 0 {
        return Err(SegError::invalid_input(format!(
            "boundaries must start at 0; got {}",
            boundaries[0]
        )));
    }
    let last = boundaries[boundaries.len() - 1];
    if last != n {
        return Err(SegError::invalid_input(format!(
            "boundaries must end at n={n}; got {last}"
        )));
    }
    if let Some(idx) = boundaries.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(SegError::invalid_input(format!(
            "boundaries must be strictly increasing; violation at index {}: {} >= {}",
            idx + 1,
            boundaries[idx],
            boundaries[idx + 1]
        )));
    }
    Ok(())
}

/// Half-open `[start, end)` spans described by a boundary list.
pub fn segments_from_boundaries(boundaries: &[usize]) -> Vec<(usize, usize)> {
    boundaries
        .windows(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

/// Boundaries plus one structural label per segment.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segmentation {
    pub boundaries: Vec<usize>,
    pub labels: Vec<usize>,
}

impl Segmentation {
    /// Builds a validated segmentation over `n` frames.
    pub fn new(n: usize, boundaries: Vec<usize>, labels: Vec<usize>) -> Result<Self, SegError> {
        validate_boundaries(n, &boundaries)?;
        if labels.len() + 1 != boundaries.len() {
            return Err(SegError::invalid_input(format!(
                "labels length must be boundaries length - 1; got labels={}, boundaries={}",
                labels.len(),
                boundaries.len()
            )));
        }
        Ok(Self { boundaries, labels })
    }

    /// Number of frames covered.
    pub fn len(&self) -> usize {
        self.boundaries.last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn segment_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of distinct structural labels.
    pub fn label_count(&self) -> usize {
        let mut seen = self.labels.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    pub fn segments(&self) -> Vec<(usize, usize)> {
        segments_from_boundaries(&self.boundaries)
    }

    /// Expands segment labels to one label per frame.
    pub fn frame_labels(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.len());
        for ((start, end), &label) in self.segments().into_iter().zip(&self.labels) {
            out.extend(std::iter::repeat_n(label, end - start));
        }
        out
    }
}

/// One level of a hierarchical result.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyLevel {
    /// Cluster count requested for this level.
    pub requested: usize,
    /// Cluster count the level actually ended up with.
    pub achieved: usize,
    pub segmentation: Segmentation,
}

/// Output of a segmentation strategy.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentationResult {
    Single(Segmentation),
    /// Levels in request order; achieved counts may repeat.
    Hierarchical(Vec<HierarchyLevel>),
}

impl SegmentationResult {
    pub fn as_single(&self) -> Option<&Segmentation> {
        match self {
            Self::Single(seg) => Some(seg),
            Self::Hierarchical(_) => None,
        }
    }

    pub fn levels(&self) -> &[HierarchyLevel] {
        match self {
            Self::Single(_) => &[],
            Self::Hierarchical(levels) => levels,
        }
    }

    /// Every segmentation carried by the result, in order.
    pub fn segmentations(&self) -> Vec<&Segmentation> {
        match self {
            Self::Single(seg) => vec![seg],
            Self::Hierarchical(levels) => levels.iter().map(|level| &level.segmentation).collect(),
        }
    }
}

/// Result plus the diagnostics of the run that produced it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationReport {
    pub result: SegmentationResult,
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::{
        HierarchyLevel, Segmentation, SegmentationResult, segments_from_boundaries,
        validate_boundaries,
    };
    use crate::SegError;

    #[test]
    fn validate_boundaries_accepts_contract() {
        validate_boundaries(5, &[0, 5]).expect("single segment is valid");
        validate_boundaries(5, &[0, 2, 5]).expect("two segments are valid");
    }

    #[test]
    fn validate_boundaries_rejects_violations() {
        for (n, bounds, needle) in [
            (5, vec![0], "at least"),
            (5, vec![1, 5], "start at 0"),
            (5, vec![0, 4], "end at n=5"),
            (5, vec![0, 3, 3, 5], "strictly increasing"),
        ] {
            let err = validate_boundaries(n, &bounds).expect_err("violation must fail");
            assert!(matches!(err, SegError::InvalidInput(_)));
            assert!(err.to_string().contains(needle), "{err}");
        }
    }

    #[test]
    fn segmentation_requires_one_label_per_segment() {
        let err = Segmentation::new(4, vec![0, 2, 4], vec![0]).expect_err("label count mismatch");
        assert!(err.to_string().contains("labels length"));
    }

    #[test]
    fn frame_labels_expand_segments() {
        let seg = Segmentation::new(5, vec![0, 2, 5], vec![1, 0]).expect("valid segmentation");
        assert_eq!(seg.len(), 5);
        assert_eq!(seg.segment_count(), 2);
        assert_eq!(seg.label_count(), 2);
        assert_eq!(seg.frame_labels(), vec![1, 1, 0, 0, 0]);
        assert_eq!(segments_from_boundaries(&seg.boundaries), vec![(0, 2), (2, 5)]);
    }

    #[test]
    fn result_accessors_cover_both_variants() {
        let seg = Segmentation::new(2, vec![0, 2], vec![0]).expect("valid segmentation");
        let single = SegmentationResult::Single(seg.clone());
        assert_eq!(single.as_single(), Some(&seg));
        assert!(single.levels().is_empty());

        let hier = SegmentationResult::Hierarchical(vec![HierarchyLevel {
            requested: 2,
            achieved: 1,
            segmentation: seg.clone(),
        }]);
        assert!(hier.as_single().is_none());
        assert_eq!(hier.levels().len(), 1);
        assert_eq!(hier.segmentations(), vec![&seg]);
    }
}
