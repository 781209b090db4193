// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Seeded k-means restarts on top of `linfa-clustering`.

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use sseg_core::{Matrix, ReproMode, SegError};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub const DEFAULT_N_INIT: usize = 100;
pub const DEFAULT_MAX_ITER: usize = 300;
pub const DEFAULT_TOL: f64 = 1e-4;

/// Configuration for seeded k-means++ with restarts.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansConfig {
    pub n_clusters: usize,
    /// Independent k-means++ restarts; the lowest-inertia fit wins.
    pub n_init: usize,
    pub max_iter: usize,
    /// Convergence threshold on the centroid shift.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: 8,
            n_init: DEFAULT_N_INIT,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
            seed: 0,
        }
    }
}

impl KMeansConfig {
    pub fn with_clusters(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SegError> {
        if self.n_clusters == 0 {
            return Err(SegError::invalid_input(
                "KMeansConfig.n_clusters must be >= 1; got 0",
            ));
        }
        if self.max_iter == 0 {
            return Err(SegError::invalid_input(
                "KMeansConfig.max_iter must be >= 1; got 0",
            ));
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(SegError::invalid_input(format!(
                "KMeansConfig.tol must be finite and > 0; got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

/// Best fit over all restarts.
#[derive(Clone, Debug, PartialEq)]
pub struct KMeansFit {
    /// One label per row, renumbered in order of first appearance.
    pub labels: Vec<usize>,
    /// One row per label. Fewer than `n_clusters` rows when the data has
    /// fewer distinct samples than requested clusters.
    pub centroids: Matrix,
    /// Sum of squared distances to the assigned centroids.
    pub inertia: f64,
    /// Index of the restart that produced this fit.
    pub restart: usize,
}

/// Clusters the rows of `data` into `config.n_clusters` groups.
///
/// Restart `i` runs linfa's k-means++ with an RNG seeded by `seed + i`, so
/// the result is identical whether restarts run sequentially or in parallel;
/// ties in inertia go to the lowest restart index. Data with at most
/// `n_clusters` distinct rows is partitioned exactly without fitting.
pub fn kmeans(
    data: &Matrix,
    config: &KMeansConfig,
    repro: ReproMode,
) -> Result<KMeansFit, SegError> {
    config.validate()?;
    if data.rows() == 0 {
        return Err(SegError::invalid_input("k-means requires at least one sample"));
    }
    if config.n_clusters > data.rows() {
        return Err(SegError::invalid_input(format!(
            "k-means n_clusters={} exceeds sample count {}",
            config.n_clusters,
            data.rows()
        )));
    }
    if !data.all_finite() {
        return Err(SegError::numerical_issue("k-means input contains non-finite values"));
    }

    if let Some(fit) = exact_partition(data, config.n_clusters) {
        return Ok(fit);
    }

    let records = Array2::from_shape_vec((data.rows(), data.cols()), data.as_slice().to_vec())
        .map_err(|err| SegError::invalid_input(format!("k-means input has a bad shape: {err}")))?;
    let restarts = repro.restarts(config.n_init);
    let fits = run_restarts(&records, config, restarts, repro)?;

    let mut best: Option<KMeansFit> = None;
    for fit in fits {
        let better = match &best {
            None => true,
            Some(current) => fit.inertia < current.inertia,
        };
        if better {
            best = Some(fit);
        }
    }
    let mut best = best.ok_or_else(|| SegError::numerical_issue("k-means produced no fit"))?;
    relabel_by_first_appearance(&mut best);
    Ok(best)
}

#[cfg(feature = "rayon")]
fn run_restarts(
    records: &Array2<f64>,
    config: &KMeansConfig,
    restarts: usize,
    repro: ReproMode,
) -> Result<Vec<KMeansFit>, SegError> {
    if repro.allows_parallel() && restarts > 1 {
        return (0..restarts)
            .into_par_iter()
            .map(|restart| single_run(records, config, restart))
            .collect();
    }
    (0..restarts)
        .map(|restart| single_run(records, config, restart))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn run_restarts(
    records: &Array2<f64>,
    config: &KMeansConfig,
    restarts: usize,
    _repro: ReproMode,
) -> Result<Vec<KMeansFit>, SegError> {
    (0..restarts)
        .map(|restart| single_run(records, config, restart))
        .collect()
}

fn single_run(
    records: &Array2<f64>,
    config: &KMeansConfig,
    restart: usize,
) -> Result<KMeansFit, SegError> {
    let rng = StdRng::seed_from_u64(config.seed.wrapping_add(restart as u64));
    let dataset = DatasetBase::from(records.clone());
    let model = KMeans::params_with_rng(config.n_clusters, rng)
        .n_runs(1)
        .max_n_iterations(config.max_iter as u64)
        .tolerance(config.tol)
        .fit(&dataset)
        .map_err(|err| {
            SegError::numerical_issue(format!("k-means restart {restart} failed: {err}"))
        })?;
    let assigned: Array1<usize> = model.predict(records);
    let labels = assigned.to_vec();

    let centroids = model.centroids();
    let (k, d) = centroids.dim();
    let centroids = Matrix::new(k, d, centroids.iter().copied().collect())?;
    let inertia = labels
        .iter()
        .enumerate()
        .map(|(r, &label)| squared_distance(records.row(r).iter().copied(), centroids.row(label)))
        .sum::<f64>();
    if !inertia.is_finite() {
        return Err(SegError::numerical_issue(format!(
            "k-means restart {restart} produced non-finite inertia"
        )));
    }
    Ok(KMeansFit {
        labels,
        centroids,
        inertia,
        restart,
    })
}

fn squared_distance(a: impl Iterator<Item = f64>, b: &[f64]) -> f64 {
    a.zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Exact clustering when there are no more distinct rows than clusters.
fn exact_partition(data: &Matrix, n_clusters: usize) -> Option<KMeansFit> {
    let mut distinct: Vec<usize> = Vec::with_capacity(n_clusters);
    let mut labels = Vec::with_capacity(data.rows());
    for r in 0..data.rows() {
        let row = data.row(r);
        match distinct.iter().position(|&seen| data.row(seen) == row) {
            Some(label) => labels.push(label),
            None => {
                if distinct.len() == n_clusters {
                    return None;
                }
                labels.push(distinct.len());
                distinct.push(r);
            }
        }
    }

    let mut centroids = Matrix::zeros(distinct.len(), data.cols());
    for (label, &r) in distinct.iter().enumerate() {
        centroids.row_mut(label).copy_from_slice(data.row(r));
    }
    Some(KMeansFit {
        labels,
        centroids,
        inertia: 0.0,
        restart: 0,
    })
}

fn relabel_by_first_appearance(fit: &mut KMeansFit) {
    let k = fit.centroids.rows();
    let mut mapping = vec![usize::MAX; k];
    let mut next = 0;
    for &label in &fit.labels {
        if mapping[label] == usize::MAX {
            mapping[label] = next;
            next += 1;
        }
    }
    for slot in mapping.iter_mut() {
        if *slot == usize::MAX {
            *slot = next;
            next += 1;
        }
    }

    let old = fit.centroids.clone();
    for (old_idx, &new_idx) in mapping.iter().enumerate() {
        fit.centroids.row_mut(new_idx).copy_from_slice(old.row(old_idx));
    }
    for label in fit.labels.iter_mut() {
        *label = mapping[*label];
    }
}
