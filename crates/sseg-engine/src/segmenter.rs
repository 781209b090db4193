// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::options::SegmentOptions;
use crate::pipeline::{ClusterMethod, build_data, segment_single_frame};
use crate::run_log::RunLog;
use crate::string_matching::segment_string_matching;
use sseg_core::{ExecutionContext, SegError, SegmentationResult, SequenceOracle};

/// Top-level segmentation methods.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentationMethod {
    SymbolAgglomerative,
    StringAgglomerative,
    SymbolSpectral,
    SymbolSpectralAgglomerative,
}

impl SegmentationMethod {
    pub const ALL: [Self; 4] = [
        Self::SymbolAgglomerative,
        Self::StringAgglomerative,
        Self::SymbolSpectral,
        Self::SymbolSpectralAgglomerative,
    ];

    /// Parses a method name; `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SymbolAgglomerative => "symbol_agglomerative",
            Self::StringAgglomerative => "string_agglomerative",
            Self::SymbolSpectral => "symbol_spectral",
            Self::SymbolSpectralAgglomerative => "symbol_spectral_agglomerative",
        }
    }
}

/// Common contract of every segmentation strategy.
pub trait Segmenter {
    fn method(&self) -> SegmentationMethod;

    fn segment(
        &self,
        oracle: &dyn SequenceOracle,
        options: &SegmentOptions,
        ctx: &ExecutionContext<'_>,
        log: &mut RunLog,
    ) -> Result<SegmentationResult, SegError>;
}

/// Constrained ward clustering of frame data.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolAgglomerative;

/// Greedy edit-distance merging of repeated fragments.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringAgglomerative;

/// Spectral clustering with entropy order selection.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolSpectral;

/// Spectral embedding followed by a ward cut.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymbolSpectralAgglomerative;

impl Segmenter for SymbolAgglomerative {
    fn method(&self) -> SegmentationMethod {
        SegmentationMethod::SymbolAgglomerative
    }

    fn segment(
        &self,
        oracle: &dyn SequenceOracle,
        options: &SegmentOptions,
        ctx: &ExecutionContext<'_>,
        log: &mut RunLog,
    ) -> Result<SegmentationResult, SegError> {
        segment_single_frame(oracle, ClusterMethod::Agglomerative, options, ctx, log)
    }
}

impl Segmenter for StringAgglomerative {
    fn method(&self) -> SegmentationMethod {
        SegmentationMethod::StringAgglomerative
    }

    fn segment(
        &self,
        oracle: &dyn SequenceOracle,
        options: &SegmentOptions,
        ctx: &ExecutionContext<'_>,
        log: &mut RunLog,
    ) -> Result<SegmentationResult, SegError> {
        if options.is_hierarchical() {
            log.warn("hierarchical output is not available for string_agglomerative; returning a single segmentation");
        }
        let data = build_data(oracle, options.data)?;
        segment_string_matching(oracle, &data, options, ctx, log)
    }
}

impl Segmenter for SymbolSpectral {
    fn method(&self) -> SegmentationMethod {
        SegmentationMethod::SymbolSpectral
    }

    fn segment(
        &self,
        oracle: &dyn SequenceOracle,
        options: &SegmentOptions,
        ctx: &ExecutionContext<'_>,
        log: &mut RunLog,
    ) -> Result<SegmentationResult, SegError> {
        segment_single_frame(oracle, ClusterMethod::Spectral, options, ctx, log)
    }
}

impl Segmenter for SymbolSpectralAgglomerative {
    fn method(&self) -> SegmentationMethod {
        SegmentationMethod::SymbolSpectralAgglomerative
    }

    fn segment(
        &self,
        oracle: &dyn SequenceOracle,
        options: &SegmentOptions,
        ctx: &ExecutionContext<'_>,
        log: &mut RunLog,
    ) -> Result<SegmentationResult, SegError> {
        segment_single_frame(oracle, ClusterMethod::SpectralAgglomerative, options, ctx, log)
    }
}
