// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::SegError;

/// Maps a possibly out-of-range index into `0..n` by mirror reflection
/// without repeating the edge sample (`[c b | a b c d | c b]`).
///
/// Offsets longer than the sequence keep reflecting back and forth.
pub fn reflect_index(idx: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = idx.rem_euclid(period);
    if m < n as isize {
        m as usize
    } else {
        (period - m) as usize
    }
}

/// Reflect-pads `values` with `before` and `after` mirrored samples.
pub fn reflect_pad<T: Copy>(values: &[T], before: usize, after: usize) -> Vec<T> {
    let n = values.len();
    if n == 0 {
        return vec![];
    }
    let total = before + n + after;
    (0..total)
        .map(|i| values[reflect_index(i as isize - before as isize, n)])
        .collect()
}

/// Median filter with an odd window, zero-padded at both ends.
pub fn median_filter(values: &[f64], width: usize) -> Result<Vec<f64>, SegError> {
    if width == 0 || width % 2 == 0 {
        return Err(SegError::invalid_input(format!(
            "median filter width must be odd and >= 1; got {width}"
        )));
    }
    let half = width / 2;
    let n = values.len();
    let mut window = Vec::with_capacity(width);
    let mut out = Vec::with_capacity(n);
    for center in 0..n {
        window.clear();
        for offset in 0..width {
            let idx = center as isize + offset as isize - half as isize;
            let value = if idx < 0 || idx >= n as isize {
                0.0
            } else {
                values[idx as usize]
            };
            window.push(value);
        }
        window.sort_by(|a, b| a.total_cmp(b));
        out.push(window[half]);
    }
    Ok(out)
}

/// Sliding-window mode over reflect-padded labels.
///
/// The window of length `width` is centred on each frame (`width / 2` frames
/// before it), so the output has one entry per input label. Ties resolve to
/// the smallest label. A width of 0 behaves like 1.
pub fn sliding_mode(labels: &[usize], width: usize) -> Vec<usize> {
    let n = labels.len();
    let width = width.max(1);
    if n == 0 || width == 1 {
        return labels.to_vec();
    }

    let before = width / 2;
    let after = width - 1 - before;
    let padded = reflect_pad(labels, before, after);

    let mut counts: Vec<(usize, usize)> = Vec::with_capacity(width);
    let mut out = Vec::with_capacity(n);
    for start in 0..n {
        counts.clear();
        for &label in &padded[start..start + width] {
            match counts.iter_mut().find(|(value, _)| *value == label) {
                Some((_, count)) => *count += 1,
                None => counts.push((label, 1)),
            }
        }
        let mode = counts
            .iter()
            .copied()
            .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then_with(|| vb.cmp(va)))
            .map_or(labels[start], |(value, _)| value);
        out.push(mode);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{median_filter, reflect_index, reflect_pad, sliding_mode};

    #[test]
    fn reflect_pad_mirrors_without_edge_repeat() {
        assert_eq!(reflect_pad(&[1, 2, 3, 4], 2, 2), vec![3, 2, 1, 2, 3, 4, 3, 2]);
        assert_eq!(reflect_pad(&[7], 3, 1), vec![7, 7, 7, 7, 7]);
        assert!(reflect_pad::<u8>(&[], 2, 2).is_empty());
    }

    #[test]
    fn reflect_index_handles_long_offsets() {
        // [a b c] extended: ... b c b | a b c | b a b c ...
        assert_eq!(reflect_index(-1, 3), 1);
        assert_eq!(reflect_index(-2, 3), 2);
        assert_eq!(reflect_index(-3, 3), 1);
        assert_eq!(reflect_index(3, 3), 1);
        assert_eq!(reflect_index(4, 3), 0);
        assert_eq!(reflect_index(5, 3), 1);
    }

    #[test]
    fn median_filter_removes_single_spike() {
        let out = median_filter(&[1.0, 1.0, 9.0, 1.0, 1.0], 3).expect("odd width");
        assert_eq!(out, vec![1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn median_filter_rejects_even_width() {
        assert!(median_filter(&[1.0, 2.0], 4).is_err());
        assert!(median_filter(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn sliding_mode_smooths_short_flips() {
        let labels = [0, 0, 0, 1, 0, 0, 2, 2, 2, 2];
        assert_eq!(sliding_mode(&labels, 3), vec![0, 0, 0, 0, 0, 0, 2, 2, 2, 2]);
    }

    #[test]
    fn sliding_mode_ties_prefer_smallest_label() {
        // Both width-2 windows over the padded [0, 1, 0] are ties.
        assert_eq!(sliding_mode(&[1, 0], 2), vec![0, 0]);
        assert_eq!(sliding_mode(&[3, 3], 0), vec![3, 3]);
    }

    #[test]
    fn sliding_mode_even_width_keeps_length() {
        // Width 6 puts three frames before the centre and two after.
        let labels = [0, 0, 0, 0, 1, 1, 1, 1];
        assert_eq!(sliding_mode(&labels, 6), vec![0, 0, 0, 0, 0, 1, 1, 1]);
        let labels = [2, 2, 2, 2, 2, 2, 2];
        assert_eq!(sliding_mode(&labels, 4), labels.to_vec());
    }
}
