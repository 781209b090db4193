// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Dense numeric building blocks used by the segmentation engine.

pub mod eigen;
pub mod filters;
pub mod kmeans;
pub mod lag;
pub mod laplacian;
pub mod linkage;
pub mod strings;
pub mod sync;

pub use eigen::{Embedding, SymmetricEigen, smallest_eigenvectors, symmetric_eigen};
pub use filters::{median_filter, reflect_index, reflect_pad, sliding_mode};
pub use kmeans::{KMeansConfig, KMeansFit, kmeans};
pub use lag::{lag_to_recurrence, recurrence_to_lag};
pub use laplacian::normalized_laplacian;
pub use linkage::{Criterion, LinkageTree, Merge, ward_tree};
pub use strings::{edit_distance, entropy};
pub use sync::{normalize_rows, segment_means};
