// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Levenshtein distance with unit insert, delete and substitute costs.
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, x) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(x != y);
            curr[j + 1] = substitute.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Shannon entropy in nats of a (possibly unnormalized) distribution.
///
/// Zero and non-finite masses are ignored; an empty or all-zero input has
/// entropy 0.
pub fn entropy(weights: &[f64]) -> f64 {
    let total: f64 = weights
        .iter()
        .copied()
        .filter(|w| w.is_finite() && *w > 0.0)
        .sum();
    if total <= 0.0 {
        return 0.0;
    }
    weights
        .iter()
        .copied()
        .filter(|w| w.is_finite() && *w > 0.0)
        .map(|w| {
            let p = w / total;
            -p * p.ln()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::{edit_distance, entropy};

    #[test]
    fn edit_distance_known_values() {
        assert_eq!(edit_distance(b"kitten", b"sitting"), 3);
        assert_eq!(edit_distance(b"", b"abc"), 3);
        assert_eq!(edit_distance(b"abc", b""), 3);
        assert_eq!(edit_distance(&[1, 2, 3], &[1, 2, 3]), 0);
        assert_eq!(edit_distance(&[0, 1], &[1, 0]), 2);
    }

    #[test]
    fn edit_distance_is_symmetric() {
        let a = [3, 1, 4, 1, 5, 9];
        let b = [2, 7, 1, 8, 2, 8];
        assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
    }

    #[test]
    fn entropy_of_uniform_is_log_n() {
        let h = entropy(&[0.25, 0.25, 0.25, 0.25]);
        assert!((h - 4f64.ln()).abs() < 1e-12);
        assert!((entropy(&[3.0, 3.0, 3.0]) - 3f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn entropy_of_degenerate_distribution_is_zero() {
        assert_eq!(entropy(&[1.0]), 0.0);
        assert_eq!(entropy(&[0.0, 5.0, 0.0]), 0.0);
        assert_eq!(entropy(&[]), 0.0);
    }
}
