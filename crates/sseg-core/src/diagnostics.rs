// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::repro::ReproMode;
use std::borrow::Cow;

/// Diagnostics schema version for segmentation run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// A fallback taken instead of failing.
///
/// Every variant corresponds to a path where the engine kept going with a
/// weaker result; callers inspect these to detect degraded output.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Degradation {
    /// Unrecognized method name; spectral segmentation was used.
    UnknownMethod { requested: String },
    /// Boundary window relaxation reached width 1 with too few boundaries.
    BoundaryWindowExhausted { required: usize, found: usize },
    /// Fewer eigenvalues than the requested embedding rank.
    EigenRankReduced { requested: usize, available: usize },
    /// Segment labeling asked for more clusters than segments.
    ClusterCountClamped { requested: usize, segments: usize },
    /// Embedding rank too small for any hierarchy level; a single
    /// one-segment level was returned.
    HierarchyCollapsed { rank: usize },
}

impl Degradation {
    /// Stable identifier used for telemetry keys.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownMethod { .. } => "unknown_method",
            Self::BoundaryWindowExhausted { .. } => "boundary_window_exhausted",
            Self::EigenRankReduced { .. } => "eigen_rank_reduced",
            Self::ClusterCountClamped { .. } => "cluster_count_clamped",
            Self::HierarchyCollapsed { .. } => "hierarchy_collapsed",
        }
    }
}

/// Structured diagnostics captured from a segmentation call.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostics {
    pub n: usize,
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub runtime_ms: Option<u64>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub method: Cow<'static, str>,
    pub seed: Option<u64>,
    pub repro_mode: ReproMode,
    pub degradations: Vec<Degradation>,
    #[cfg(feature = "serde")]
    pub params_json: Option<serde_json::Value>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            n: 0,
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            runtime_ms: None,
            notes: vec![],
            warnings: vec![],
            method: Cow::Borrowed(""),
            seed: None,
            repro_mode: ReproMode::Balanced,
            degradations: vec![],
            #[cfg(feature = "serde")]
            params_json: None,
        }
    }
}

impl Diagnostics {
    /// Returns true when any fallback path was taken.
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
