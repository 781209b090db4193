// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::SegError;

/// Dense row-major `f64` matrix.
///
/// Rows are observations (frames, segments, fragments) and columns are
/// feature dimensions, except for square affinity matrices where both axes
/// index observations.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Builds a matrix from a row-major buffer.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, SegError> {
        let expected = rows
            .checked_mul(cols)
            .ok_or_else(|| SegError::resource_limit("rows*cols overflow while building matrix"))?;
        if data.len() != expected {
            return Err(SegError::invalid_input(format!(
                "matrix buffer length mismatch: got {}, expected {expected} (rows={rows}, cols={cols})",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut out = Self::zeros(n, n);
        for i in 0..n {
            out.data[i * n + i] = 1.0;
        }
        out
    }

    /// Builds a matrix from equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SegError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(SegError::invalid_input(format!(
                    "ragged rows: row {idx} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.data[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        out
    }

    /// Copies the first `cols` columns into a new matrix.
    pub fn leading_columns(&self, cols: usize) -> Self {
        let cols = cols.min(self.cols);
        let mut out = Self::zeros(self.rows, cols);
        for r in 0..self.rows {
            out.row_mut(r).copy_from_slice(&self.row(r)[..cols]);
        }
        out
    }

    /// Returns true when `|a_ij - a_ji| <= tol` for every pair.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        if !self.is_square() {
            return false;
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    pub fn all_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Validates a square, finite, non-negative affinity matrix of size `n`.
    pub fn validate_affinity(&self, n: usize) -> Result<(), SegError> {
        if !self.is_square() || self.rows != n {
            return Err(SegError::invalid_input(format!(
                "connectivity must be {n}x{n}; got {}x{}",
                self.rows, self.cols
            )));
        }
        if let Some((idx, value)) = self
            .data
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(SegError::invalid_input(format!(
                "connectivity entries must be finite and >= 0; entry ({}, {}) is {value}",
                idx / n.max(1),
                idx % n.max(1)
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Matrix;
    use crate::SegError;

    #[test]
    fn new_rejects_buffer_length_mismatch() {
        let err = Matrix::new(2, 3, vec![0.0; 5]).expect_err("mismatch must fail");
        assert!(matches!(err, SegError::InvalidInput(_)));
    }

    #[test]
    fn from_rows_rejects_ragged_input() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).expect_err("ragged must fail");
        assert!(err.to_string().contains("row 1 has 1 columns"));
    }

    #[test]
    fn transpose_and_accessors_agree() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
            .expect("rows should be valid");
        let t = m.transpose();
        assert_eq!(t.rows(), 3);
        assert_eq!(t.cols(), 2);
        assert_eq!(t.row(2), &[3.0, 6.0]);
        assert_eq!(m.leading_columns(2).row(1), &[4.0, 5.0]);
    }

    #[test]
    fn symmetry_and_affinity_validation() {
        let mut m = Matrix::identity(3);
        assert!(m.is_symmetric(0.0));
        m.set(0, 2, 0.5);
        assert!(!m.is_symmetric(1e-12));
        m.set(2, 0, 0.5);
        assert!(m.validate_affinity(3).is_ok());

        m.set(1, 2, -1.0);
        let err = m.validate_affinity(3).expect_err("negative entry must fail");
        assert!(err.to_string().contains("entry (1, 2)"));

        let err = m.validate_affinity(4).expect_err("size mismatch must fail");
        assert!(err.to_string().contains("must be 4x4"));
    }
}
