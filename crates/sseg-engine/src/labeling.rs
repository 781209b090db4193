// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::run_log::RunLog;
use sseg_core::{Degradation, ExecutionContext, Matrix, SegError};
use sseg_linalg::{Criterion, KMeansConfig, kmeans, segment_means, ward_tree};

/// Fixed ratio used by fragment string matching for its agglomerative labeling.
pub const STRING_LABEL_RATIO: f64 = 0.05;

/// How segment representatives are grouped into structural labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LabelMethod {
    /// k-means with `k` clusters.
    KMeans { k: usize },
    /// Ward tree cut at `ratio * max merge distance`.
    Agglomerative { ratio: f64 },
}

/// Labels each segment by clustering its mean frame.
pub fn label_segments(
    data: &Matrix,
    boundaries: &[usize],
    method: LabelMethod,
    n_init: usize,
    seed: u64,
    ctx: &ExecutionContext<'_>,
    log: &mut RunLog,
) -> Result<Vec<usize>, SegError> {
    let representatives = segment_means(data, boundaries)?;
    let segments = representatives.rows();

    match method {
        LabelMethod::KMeans { k } => {
            let mut k = k.max(1);
            if k > segments {
                log.degrade(
                    ctx,
                    Degradation::ClusterCountClamped {
                        requested: k,
                        segments,
                    },
                );
                k = segments;
            }
            let config = KMeansConfig {
                n_init,
                ..KMeansConfig::with_clusters(k, seed)
            };
            Ok(kmeans(&representatives, &config, ctx.repro_mode)?.labels)
        }
        LabelMethod::Agglomerative { ratio } => {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(SegError::invalid_input(format!(
                    "agglomerative label ratio must be finite and >= 0; got {ratio}"
                )));
            }
            let tree = ward_tree(&representatives, None)?;
            tree.fcluster(ratio * tree.max_distance(), Criterion::Distance)
        }
    }
}
