// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Core shared types for the sseg structural segmentation engine.

pub mod diagnostics;
pub mod error;
pub mod execution_context;
pub mod matrix;
pub mod observability;
pub mod oracle;
pub mod repro;
pub mod results;

pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, Degradation, Diagnostics};
pub use error::SegError;
pub use execution_context::ExecutionContext;
pub use matrix::Matrix;
pub use observability::{ProgressSink, TelemetrySink};
pub use oracle::{FragmentRecord, SequenceOracle, SymbolSequence};
pub use repro::{FAST_MODE_MAX_RESTARTS, ReproMode};
pub use results::{
    HierarchyLevel, Segmentation, SegmentationReport, SegmentationResult,
    segments_from_boundaries, validate_boundaries,
};
