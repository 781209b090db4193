// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::connectivity::preprocess_connectivity;
use crate::hierarchical::segment_by_ward;
use crate::options::{ConnectivitySource, DataRepresentation, SegmentOptions};
use crate::run_log::RunLog;
use crate::spectral::segment_spectral;
use crate::spectral_agg::segment_spectral_agg;
use sseg_core::{ExecutionContext, Matrix, SegError, SegmentationResult, SequenceOracle};

/// Frame clustering family used by single-frame segmentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterMethod {
    /// Constrained ward tree over the frame data.
    Agglomerative,
    /// Laplacian embedding with entropy order selection.
    Spectral,
    /// Laplacian embedding cut with an unconstrained ward tree.
    SpectralAgglomerative,
}

/// Builds the frame data matrix (one row per observation).
pub fn build_data(
    oracle: &dyn SequenceOracle,
    representation: DataRepresentation,
) -> Result<Matrix, SegError> {
    let n = oracle.observation_count();
    match representation {
        DataRepresentation::Symbol => {
            let symbols = oracle.symbols();
            if symbols.len() != oracle.n_states() {
                return Err(SegError::invalid_oracle(format!(
                    "oracle reports {} states but {} symbols",
                    oracle.n_states(),
                    symbols.len()
                )));
            }
            let k = oracle.num_clusters();
            let mut data = Matrix::zeros(n, k);
            for (row, &symbol) in symbols[1..].iter().enumerate() {
                if symbol >= k {
                    return Err(SegError::invalid_oracle(format!(
                        "state {} has symbol {symbol} but the oracle reports {k} clusters",
                        row + 1
                    )));
                }
                data.set(row, symbol, 1.0);
            }
            Ok(data)
        }
        DataRepresentation::Raw => {
            let features = oracle.features();
            if features.len() != oracle.n_states() {
                return Err(SegError::invalid_oracle(format!(
                    "raw data requires one feature vector per state; got {} for {} states",
                    features.len(),
                    oracle.n_states()
                )));
            }
            let data = Matrix::from_rows(&features[1..])?;
            if data.cols() == 0 {
                return Err(SegError::invalid_oracle("feature vectors are empty"));
            }
            if !data.all_finite() {
                return Err(SegError::invalid_oracle("feature vectors contain non-finite values"));
            }
            Ok(data)
        }
    }
}

/// Builds the `n x n` connectivity matrix requested by `source`.
pub fn build_connectivity(
    oracle: &dyn SequenceOracle,
    source: &ConnectivitySource,
) -> Result<Matrix, SegError> {
    let n = oracle.observation_count();
    let connectivity = match source {
        ConnectivitySource::Temporal => return Ok(Matrix::zeros(n, n)),
        ConnectivitySource::Matrix(matrix) => matrix.clone(),
        ConnectivitySource::SelfSimilarity(method) => oracle.self_similarity(method)?,
    };
    connectivity.validate_affinity(n)?;
    Ok(connectivity)
}

/// Smooths `connectivity` and runs one of the spectral strategies on it.
pub fn segment_by_connectivity(
    connectivity: &Matrix,
    method: ClusterMethod,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<SegmentationResult, SegError> {
    let smoothed = preprocess_connectivity(connectivity, options.median_filter_width)?;
    match method {
        ClusterMethod::SpectralAgglomerative => {
            if options.is_hierarchical() {
                log.warn("hierarchical output is not available for spectral_agg; returning a single segmentation");
            }
            segment_spectral_agg(&smoothed, options, ctx, log)
        }
        ClusterMethod::Spectral | ClusterMethod::Agglomerative => {
            segment_spectral(&smoothed, options, ctx, log)
        }
    }
}

/// Single-frame segmentation: frame data plus connectivity, then `method`.
pub fn segment_single_frame(
    oracle: &dyn SequenceOracle,
    method: ClusterMethod,
    options: &SegmentOptions,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<SegmentationResult, SegError> {
    let connectivity = build_connectivity(oracle, &options.connectivity)?;
    match method {
        ClusterMethod::Agglomerative => {
            let data = build_data(oracle, options.data)?;
            segment_by_ward(&data, &connectivity, options, ctx, log)
        }
        ClusterMethod::Spectral | ClusterMethod::SpectralAgglomerative => {
            segment_by_connectivity(&connectivity, method, options, ctx, log)
        }
    }
}
