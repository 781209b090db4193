// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{Matrix, SegError};

/// One maximal repeated fragment of the symbol sequence.
///
/// `end` is the inclusive state index of the fragment's last state (states are
/// 1-based, state 0 is the sentinel) and `len` its length in states.
/// `recurrence` points at the earlier fragment holding the first occurrence of
/// the repeated material, if any.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentRecord {
    pub end: usize,
    pub len: usize,
    pub recurrence: Option<usize>,
}

impl FragmentRecord {
    /// First state covered by the fragment.
    pub fn start(&self) -> usize {
        self.end + 1 - self.len
    }
}

/// Contract of the sequence model consumed by the segmentation engine.
///
/// Index 0 of [`symbols`](Self::symbols) and [`features`](Self::features) is the
/// sentinel start state and is never analysed.
pub trait SequenceOracle {
    /// Number of states including the sentinel.
    fn n_states(&self) -> usize;

    /// Symbol (cluster id) per state.
    fn symbols(&self) -> &[usize];

    /// Raw feature vector per state. Empty when the model carries no features.
    fn features(&self) -> &[Vec<f64>];

    /// Number of distinct symbol clusters.
    fn num_clusters(&self) -> usize;

    /// Builds an observation-by-observation self-similarity matrix.
    fn self_similarity(&self, method: &str) -> Result<Matrix, SegError> {
        Err(SegError::not_supported(format!(
            "self-similarity method '{method}' is not provided by this oracle"
        )))
    }

    /// Extracts maximal repeated fragments in sequence order.
    fn fragments(&self) -> Result<Vec<FragmentRecord>, SegError> {
        Err(SegError::not_supported(
            "fragment extraction is not provided by this oracle",
        ))
    }

    /// Number of analysed observations (`n_states - 1`).
    fn observation_count(&self) -> usize {
        self.n_states().saturating_sub(1)
    }
}

/// In-memory sequence model over a plain symbol string.
///
/// Provides `symbol` (equality) and `cosine` (feature) self-similarity and a
/// greedy longest-previous-match fragment extractor.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolSequence {
    symbols: Vec<usize>,
    features: Vec<Vec<f64>>,
    num_clusters: usize,
}

impl SymbolSequence {
    /// Builds a model from per-observation symbols (no sentinel).
    pub fn new(observations: &[usize]) -> Self {
        let num_clusters = observations.iter().copied().max().map_or(0, |m| m + 1);
        let mut symbols = Vec::with_capacity(observations.len() + 1);
        symbols.push(0);
        symbols.extend_from_slice(observations);
        Self {
            symbols,
            features: vec![],
            num_clusters,
        }
    }

    /// Attaches one feature vector per observation (no sentinel).
    pub fn with_features(mut self, observations: Vec<Vec<f64>>) -> Result<Self, SegError> {
        if observations.len() + 1 != self.symbols.len() {
            return Err(SegError::invalid_input(format!(
                "feature count mismatch: got {}, expected {}",
                observations.len(),
                self.symbols.len() - 1
            )));
        }
        let dim = observations.first().map_or(0, Vec::len);
        let mut features = Vec::with_capacity(observations.len() + 1);
        features.push(vec![0.0; dim]);
        features.extend(observations);
        self.features = features;
        Ok(self)
    }

    /// Overrides the cluster count (must cover every symbol).
    pub fn with_num_clusters(mut self, num_clusters: usize) -> Result<Self, SegError> {
        if let Some(max) = self.symbols[1..].iter().copied().max()
            && max >= num_clusters
        {
            return Err(SegError::invalid_input(format!(
                "num_clusters={num_clusters} does not cover symbol {max}"
            )));
        }
        self.num_clusters = num_clusters;
        Ok(self)
    }

    fn observations(&self) -> &[usize] {
        &self.symbols[1..]
    }

    fn symbol_recurrence(&self) -> Matrix {
        let obs = self.observations();
        let n = obs.len();
        let mut out = Matrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                if i != j && obs[i] == obs[j] {
                    out.set(i, j, 1.0);
                }
            }
        }
        out
    }

    fn feature_cosine(&self) -> Result<Matrix, SegError> {
        let n = self.observation_count();
        if self.features.len() != n + 1 {
            return Err(SegError::invalid_input(
                "cosine self-similarity requires one feature vector per observation",
            ));
        }
        let rows = &self.features[1..];
        let norms: Vec<f64> = rows
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect();
        let mut out = Matrix::zeros(n, n);
        for i in 0..n {
            for j in (i + 1)..n {
                let denom = norms[i] * norms[j];
                let sim = if denom > 0.0 {
                    let dot: f64 = rows[i].iter().zip(&rows[j]).map(|(a, b)| a * b).sum();
                    (dot / denom).max(0.0)
                } else {
                    0.0
                };
                out.set(i, j, sim);
                out.set(j, i, sim);
            }
        }
        Ok(out)
    }
}

impl SequenceOracle for SymbolSequence {
    fn n_states(&self) -> usize {
        self.symbols.len()
    }

    fn symbols(&self) -> &[usize] {
        &self.symbols
    }

    fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    fn self_similarity(&self, method: &str) -> Result<Matrix, SegError> {
        match method {
            "symbol" => Ok(self.symbol_recurrence()),
            "cosine" => self.feature_cosine(),
            other => Err(SegError::not_supported(format!(
                "unknown self-similarity method '{other}'; expected one of: symbol, cosine"
            ))),
        }
    }

    /// Left-to-right factorization: each fragment is the longest prefix of the
    /// remainder that already started somewhere earlier (overlap allowed), or a
    /// single new symbol. Quadratic per fragment.
    fn fragments(&self) -> Result<Vec<FragmentRecord>, SegError> {
        let obs = self.observations();
        let n = obs.len();
        let mut fragments: Vec<FragmentRecord> = vec![];
        // Fragment index owning each observation, used to resolve back-pointers.
        let mut owner = vec![0usize; n];
        let mut pos = 0usize;

        while pos < n {
            let mut best_len = 0usize;
            let mut best_src = None;
            for src in 0..pos {
                let mut len = 0usize;
                while pos + len < n && obs[src + len] == obs[pos + len] {
                    len += 1;
                }
                if len > best_len {
                    best_len = len;
                    best_src = Some(src);
                }
            }

            let len = best_len.max(1);
            let index = fragments.len();
            fragments.push(FragmentRecord {
                end: pos + len,
                len,
                recurrence: best_src.map(|src| owner[src]),
            });
            for slot in &mut owner[pos..pos + len] {
                *slot = index;
            }
            pos += len;
        }

        Ok(fragments)
    }
}
