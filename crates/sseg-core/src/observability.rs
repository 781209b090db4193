// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::Degradation;

/// Receives coarse progress in `[0, 1]` while a segmentation runs.
pub trait ProgressSink {
    fn on_progress(&self, fraction: f32);
}

/// Receives scalar metrics and degradation events.
pub trait TelemetrySink {
    fn record_scalar(&self, key: &'static str, value: f64);

    fn on_degradation(&self, _event: &Degradation) {}
}
