// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Matrix, SegError};

/// Symmetric normalized graph Laplacian `I - D^{-1/2} C D^{-1/2}`.
///
/// Rows with zero (or non-finite) degree use an inverse degree of 1, so an
/// isolated frame keeps a unit diagonal instead of producing NaN.
pub fn normalized_laplacian(affinity: &Matrix) -> Result<Matrix, SegError> {
    if !affinity.is_square() {
        return Err(SegError::invalid_input(format!(
            "laplacian requires a square affinity; got {}x{}",
            affinity.rows(),
            affinity.cols()
        )));
    }
    let n = affinity.rows();
    let inv_sqrt_degree: Vec<f64> = (0..n)
        .map(|i| {
            let degree: f64 = affinity.row(i).iter().sum();
            let inv = 1.0 / degree.sqrt();
            if inv.is_finite() { inv } else { 1.0 }
        })
        .collect();

    let mut out = Matrix::identity(n);
    for i in 0..n {
        for j in 0..n {
            let scaled = inv_sqrt_degree[i] * affinity.get(i, j) * inv_sqrt_degree[j];
            out.set(i, j, out.get(i, j) - scaled);
        }
    }
    if !out.all_finite() {
        return Err(SegError::numerical_issue(
            "laplacian produced non-finite entries",
        ));
    }
    Ok(out)
}
