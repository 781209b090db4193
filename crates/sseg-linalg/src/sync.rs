// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Matrix, SegError, segments_from_boundaries, validate_boundaries};

/// Averages the frame rows of `data` inside each `[start, end)` segment.
///
/// Output has one row per segment and the same column count as `data`.
pub fn segment_means(data: &Matrix, boundaries: &[usize]) -> Result<Matrix, SegError> {
    validate_boundaries(data.rows(), boundaries)?;
    let spans = segments_from_boundaries(boundaries);
    let mut out = Matrix::zeros(spans.len(), data.cols());
    for (seg, (start, end)) in spans.into_iter().enumerate() {
        let inv_len = 1.0 / (end - start) as f64;
        let acc = out.row_mut(seg);
        for t in start..end {
            for (slot, value) in acc.iter_mut().zip(data.row(t)) {
                *slot += value;
            }
        }
        for slot in acc.iter_mut() {
            *slot *= inv_len;
        }
    }
    Ok(out)
}

/// Scales every row to unit L2 norm; rows with a negligible norm are kept.
pub fn normalize_rows(data: &mut Matrix) {
    for r in 0..data.rows() {
        let row = data.row_mut(r);
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > f64::MIN_POSITIVE && norm.is_finite() {
            for v in row.iter_mut() {
                *v /= norm;
            }
        }
    }
}
