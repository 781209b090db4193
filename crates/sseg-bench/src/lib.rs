// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Synthetic inputs shared by the benchmarks.

use sseg_core::{Matrix, SymbolSequence};

/// Repeating verse/chorus style symbol layout: `sections` blocks of
/// `block` frames cycling through `alphabet` symbols.
pub fn block_symbols(sections: usize, block: usize, alphabet: usize) -> Vec<usize> {
    let alphabet = alphabet.max(1);
    (0..sections)
        .flat_map(|section| std::iter::repeat_n(section % alphabet, block))
        .collect()
}

pub fn block_oracle(sections: usize, block: usize, alphabet: usize) -> SymbolSequence {
    SymbolSequence::new(&block_symbols(sections, block, alphabet))
}

/// Symbol recurrence of `symbols`: 1 where two frames share a symbol.
pub fn recurrence(symbols: &[usize]) -> Matrix {
    let n = symbols.len();
    let mut m = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            if i != j && symbols[i] == symbols[j] {
                m.set(i, j, 1.0);
            }
        }
    }
    m
}
