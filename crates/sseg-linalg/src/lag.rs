// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Matrix, SegError};

fn require_square(mat: &Matrix, what: &str) -> Result<usize, SegError> {
    if !mat.is_square() {
        return Err(SegError::invalid_input(format!(
            "{what} requires a square matrix; got {}x{}",
            mat.rows(),
            mat.cols()
        )));
    }
    Ok(mat.rows())
}

/// Converts a recurrence matrix to circular lag form.
///
/// Row `l`, column `t` of the output holds `rec[(t + l) mod n][t]`, so each
/// row collects the similarity of every frame with the frame `l` steps later.
pub fn recurrence_to_lag(rec: &Matrix) -> Result<Matrix, SegError> {
    let n = require_square(rec, "lag transform")?;
    let mut out = Matrix::zeros(n, n);
    for lag in 0..n {
        for t in 0..n {
            out.set(lag, t, rec.get((t + lag) % n, t));
        }
    }
    Ok(out)
}

/// Inverse of [`recurrence_to_lag`].
pub fn lag_to_recurrence(lag: &Matrix) -> Result<Matrix, SegError> {
    let n = require_square(lag, "lag inversion")?;
    let mut out = Matrix::zeros(n, n);
    for l in 0..n {
        for t in 0..n {
            out.set((t + l) % n, t, lag.get(l, t));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{lag_to_recurrence, recurrence_to_lag};
    use sseg_core::Matrix;

    #[test]
    fn first_lag_row_is_the_diagonal() {
        let rec = Matrix::from_rows(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ])
        .expect("valid rows");
        let lag = recurrence_to_lag(&rec).expect("square input");
        assert_eq!(lag.row(0), &[1.0, 5.0, 9.0]);
        assert_eq!(lag.row(1), &[4.0, 8.0, 3.0]);
        assert_eq!(lag_to_recurrence(&lag).expect("square input"), rec);
    }

    #[test]
    fn rejects_rectangular_input() {
        assert!(recurrence_to_lag(&Matrix::zeros(2, 3)).is_err());
        assert!(lag_to_recurrence(&Matrix::zeros(3, 2)).is_err());
    }
}
