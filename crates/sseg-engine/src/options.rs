// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Matrix, SegError};
use sseg_linalg::Criterion;
use sseg_linalg::kmeans::DEFAULT_N_INIT;

pub const DEFAULT_MEDIAN_FILTER_WIDTH: usize = 9;
pub const DEFAULT_WIDTH: usize = 9;
pub const DEFAULT_K_MIN: usize = 4;
pub const DEFAULT_K_MAX: usize = 6;
pub const DEFAULT_SPECTRAL_AGG_RANK: usize = 5;

/// Where the observation-by-observation connectivity comes from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConnectivitySource {
    /// No pairwise constraint beyond temporal adjacency (all-zero matrix).
    #[default]
    Temporal,
    /// Caller-supplied square matrix.
    Matrix(Matrix),
    /// Self-similarity built by the oracle with the named method.
    SelfSimilarity(String),
}

/// Frame representation fed to clustering.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataRepresentation {
    /// Raw per-state feature vectors.
    Raw,
    /// One-hot encoding of the state's symbol.
    #[default]
    Symbol,
}

/// Requested result shape.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Single,
    /// One segmentation per candidate cluster count.
    Hierarchical,
}

/// Options shared by every segmentation method.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentOptions {
    pub connectivity: ConnectivitySource,
    pub data: DataRepresentation,
    /// Lag-domain median filter width; must be odd.
    pub median_filter_width: usize,
    /// Boundary detector window. 0 behaves like 1.
    pub width: usize,
    pub mode: OutputMode,
    pub k_min: usize,
    pub k_max: usize,
    pub criterion: Criterion,
    /// Explicit tree cut for fragment string matching.
    pub threshold: Option<f64>,
    pub seed: u64,
    /// k-means restarts.
    pub n_init: usize,
    pub spectral_agg_rank: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            connectivity: ConnectivitySource::Temporal,
            data: DataRepresentation::Symbol,
            median_filter_width: DEFAULT_MEDIAN_FILTER_WIDTH,
            width: DEFAULT_WIDTH,
            mode: OutputMode::Single,
            k_min: DEFAULT_K_MIN,
            k_max: DEFAULT_K_MAX,
            criterion: Criterion::Distance,
            threshold: None,
            seed: 0,
            n_init: DEFAULT_N_INIT,
            spectral_agg_rank: DEFAULT_SPECTRAL_AGG_RANK,
        }
    }
}

impl SegmentOptions {
    pub fn validate(&self) -> Result<(), SegError> {
        if self.median_filter_width == 0 || self.median_filter_width % 2 == 0 {
            return Err(SegError::invalid_input(format!(
                "SegmentOptions.median_filter_width must be odd and >= 1; got {}",
                self.median_filter_width
            )));
        }
        if self.k_min == 0 {
            return Err(SegError::invalid_input(
                "SegmentOptions.k_min must be >= 1; got 0",
            ));
        }
        if self.k_max < self.k_min {
            return Err(SegError::invalid_input(format!(
                "SegmentOptions.k_max must be >= k_min; got k_min={}, k_max={}",
                self.k_min, self.k_max
            )));
        }
        if let Some(threshold) = self.threshold
            && (!threshold.is_finite() || threshold < 0.0)
        {
            return Err(SegError::invalid_input(format!(
                "SegmentOptions.threshold must be finite and >= 0; got {threshold}"
            )));
        }
        if self.n_init == 0 {
            return Err(SegError::invalid_input(
                "SegmentOptions.n_init must be >= 1; got 0",
            ));
        }
        if self.spectral_agg_rank == 0 {
            return Err(SegError::invalid_input(
                "SegmentOptions.spectral_agg_rank must be >= 1; got 0",
            ));
        }
        Ok(())
    }

    pub fn is_hierarchical(&self) -> bool {
        self.mode == OutputMode::Hierarchical
    }
}
