// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Matrix, SegError};
use sseg_linalg::{lag_to_recurrence, median_filter, recurrence_to_lag, reflect_pad};

/// Smooths an affinity matrix along its lag diagonals and enforces temporal
/// adjacency.
///
/// Each lag row is reflect-padded by `width` frames, median filtered with a
/// `width`-tap kernel and cropped back. The result is symmetrized, adjacent
/// frames get similarity 1 and the diagonal is zeroed.
pub fn preprocess_connectivity(affinity: &Matrix, width: usize) -> Result<Matrix, SegError> {
    let n = affinity.rows();
    affinity.validate_affinity(n)?;
    if width == 0 || width % 2 == 0 {
        return Err(SegError::invalid_input(format!(
            "median filter width must be odd and >= 1; got {width}"
        )));
    }

    let mut lag = recurrence_to_lag(affinity)?;
    for l in 0..n {
        let padded = reflect_pad(lag.row(l), width, width);
        let filtered = median_filter(&padded, width)?;
        lag.row_mut(l).copy_from_slice(&filtered[width..width + n]);
    }
    let rec = lag_to_recurrence(&lag)?;

    let mut out = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            out.set(i, j, 0.5 * (rec.get(i, j) + rec.get(j, i)));
        }
    }
    for i in 1..n {
        out.set(i, i - 1, 1.0);
        out.set(i - 1, i, 1.0);
    }
    for i in 0..n {
        out.set(i, i, 0.0);
    }
    Ok(out)
}
