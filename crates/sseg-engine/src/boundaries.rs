// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_linalg::sliding_mode;

/// Segment start frames of a per-frame label sequence.
///
/// Labels are mode-smoothed with a centred window of `width` frames before
/// change points are taken. The result always starts at 0, ends at
/// `labels.len()` and is strictly increasing (for non-empty input).
pub fn find_boundaries(labels: &[usize], width: usize) -> Vec<usize> {
    let n = labels.len();
    if n == 0 {
        return vec![0];
    }
    let smoothed = sliding_mode(labels, width);
    let mut boundaries = Vec::with_capacity(8);
    boundaries.push(0);
    boundaries.extend(
        smoothed
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[0] != pair[1])
            .map(|(idx, _)| idx + 1),
    );
    boundaries.push(n);
    boundaries
}
