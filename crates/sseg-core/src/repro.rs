// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Restart cap applied to clustering under [`ReproMode::Fast`].
pub const FAST_MODE_MAX_RESTARTS: usize = 10;

/// Controls the determinism/throughput trade-off of clustering restarts.
///
/// Every mode is seeded, so the same seed always gives the same labels;
/// modes differ only in how restarts are scheduled and how many run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReproMode {
    /// Restarts run sequentially on the calling thread.
    Strict,
    /// Restarts may run in parallel when the `rayon` feature is enabled.
    #[default]
    Balanced,
    /// Parallel restarts, capped at [`FAST_MODE_MAX_RESTARTS`].
    Fast,
}

impl ReproMode {
    pub fn allows_parallel(self) -> bool {
        !matches!(self, Self::Strict)
    }

    /// Effective restart count for a configured `n_init`.
    pub fn restarts(self, n_init: usize) -> usize {
        let n_init = n_init.max(1);
        match self {
            Self::Fast => n_init.min(FAST_MODE_MAX_RESTARTS),
            Self::Strict | Self::Balanced => n_init,
        }
    }
}
