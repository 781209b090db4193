// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use nalgebra::DMatrix;
use sseg_core::{Matrix, SegError};

const MAX_ITERATIONS: usize = 10_000;

/// Eigen-decomposition of a symmetric matrix.
///
/// `values` are sorted ascending; column `j` of `vectors` is the unit
/// eigenvector of `values[j]`.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetricEigen {
    pub values: Vec<f64>,
    pub vectors: Matrix,
}

/// Leading eigenvectors of the smallest eigenvalues, one row per vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Embedding {
    /// `rank x n` matrix; row `i` holds the eigenvector of the i-th smallest value.
    pub vectors: Matrix,
    pub requested: usize,
}

impl Embedding {
    pub fn rank(&self) -> usize {
        self.vectors.rows()
    }

    /// True when fewer vectors than requested were available.
    pub fn is_rank_reduced(&self) -> bool {
        self.rank() < self.requested
    }
}

/// Eigen-decomposition of a symmetric matrix with nalgebra's symmetric QR.
///
/// Only the lower triangle is read. Eigenpairs are returned in ascending
/// eigenvalue order.
pub fn symmetric_eigen(mat: &Matrix) -> Result<SymmetricEigen, SegError> {
    if !mat.is_square() {
        return Err(SegError::invalid_input(format!(
            "eigen-decomposition requires a square matrix; got {}x{}",
            mat.rows(),
            mat.cols()
        )));
    }
    if !mat.all_finite() {
        return Err(SegError::numerical_issue(
            "eigen-decomposition input contains non-finite entries",
        ));
    }

    let n = mat.rows();
    if n == 0 {
        return Ok(SymmetricEigen {
            values: vec![],
            vectors: Matrix::zeros(0, 0),
        });
    }
    let dense = DMatrix::from_row_slice(n, n, mat.as_slice());
    let eigen = nalgebra::SymmetricEigen::try_new(dense, f64::EPSILON, MAX_ITERATIONS)
        .ok_or_else(|| {
            SegError::numerical_issue(format!(
                "symmetric eigen-solver did not converge in {MAX_ITERATIONS} iterations (n={n})"
            ))
        })?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        eigen.eigenvalues[i]
            .total_cmp(&eigen.eigenvalues[j])
            .then(i.cmp(&j))
    });

    let values = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
    let mut vectors = Matrix::zeros(n, n);
    for (new_col, &old_col) in order.iter().enumerate() {
        for row in 0..n {
            vectors.set(row, new_col, eigen.eigenvectors[(row, old_col)]);
        }
    }
    Ok(SymmetricEigen { values, vectors })
}

/// Eigenvectors of the `k` smallest eigenvalues, transposed to `k x n`.
///
/// When the matrix has fewer than `k + 1` eigenvalues the rank is reduced to
/// `n - 1` (at least 1); callers inspect [`Embedding::is_rank_reduced`].
pub fn smallest_eigenvectors(mat: &Matrix, k: usize) -> Result<Embedding, SegError> {
    if k == 0 {
        return Err(SegError::invalid_input(
            "embedding rank must be >= 1; got 0",
        ));
    }
    let n = mat.rows();
    if n == 0 {
        return Err(SegError::invalid_input(
            "eigen-embedding requires a non-empty matrix",
        ));
    }
    let eigen = symmetric_eigen(mat)?;
    let rank = if n < k + 1 { (n - 1).max(1) } else { k };

    let mut vectors = Matrix::zeros(rank, n);
    for i in 0..rank {
        for t in 0..n {
            vectors.set(i, t, eigen.vectors.get(t, i));
        }
    }
    Ok(Embedding {
        vectors,
        requested: k,
    })
}
