// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::Degradation;
use crate::observability::{ProgressSink, TelemetrySink};
use crate::repro::ReproMode;

/// Unified execution context passed through segmentation calls.
#[derive(Clone, Copy, Default)]
pub struct ExecutionContext<'a> {
    pub repro_mode: ReproMode,
    pub progress: Option<&'a dyn ProgressSink>,
    pub telemetry: Option<&'a dyn TelemetrySink>,
}

impl<'a> ExecutionContext<'a> {
    /// Creates a context with safe defaults and no optional hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reproducibility mode.
    pub fn with_repro_mode(mut self, repro_mode: ReproMode) -> Self {
        self.repro_mode = repro_mode;
        self
    }

    /// Sets an optional progress sink.
    pub fn with_progress_sink(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets an optional telemetry sink.
    pub fn with_telemetry_sink(mut self, telemetry: &'a dyn TelemetrySink) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Emits clamped progress to the sink, if configured.
    pub fn report_progress(&self, fraction: f32) {
        if !fraction.is_finite() {
            return;
        }

        if let Some(sink) = self.progress {
            sink.on_progress(fraction.clamp(0.0, 1.0));
        }
    }

    /// Emits a scalar telemetry value to the sink, if configured.
    pub fn record_scalar(&self, key: &'static str, value: f64) {
        if let Some(sink) = self.telemetry {
            sink.record_scalar(key, value);
        }
    }

    /// Forwards a degradation event to the sink, if configured.
    pub fn record_degradation(&self, event: &Degradation) {
        if let Some(sink) = self.telemetry {
            sink.on_degradation(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExecutionContext;
    use crate::Degradation;
    use crate::observability::{ProgressSink, TelemetrySink};
    use crate::repro::ReproMode;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockProgressSink {
        values: Mutex<Vec<f32>>,
    }

    impl ProgressSink for MockProgressSink {
        fn on_progress(&self, fraction: f32) {
            self.values
                .lock()
                .expect("progress mutex should lock")
                .push(fraction);
        }
    }

    #[derive(Default)]
    struct MockTelemetrySink {
        values: Mutex<Vec<(&'static str, f64)>>,
        events: Mutex<Vec<Degradation>>,
    }

    impl TelemetrySink for MockTelemetrySink {
        fn record_scalar(&self, key: &'static str, value: f64) {
            self.values
                .lock()
                .expect("telemetry mutex should lock")
                .push((key, value));
        }

        fn on_degradation(&self, event: &Degradation) {
            self.events
                .lock()
                .expect("event mutex should lock")
                .push(event.clone());
        }
    }

    #[test]
    fn execution_context_new_sets_expected_defaults() {
        let ctx = ExecutionContext::new();
        assert_eq!(ctx.repro_mode, ReproMode::Balanced);
        assert!(ctx.progress.is_none());
        assert!(ctx.telemetry.is_none());
    }

    #[test]
    fn builder_methods_set_requested_fields() {
        let progress = MockProgressSink::default();
        let telemetry = MockTelemetrySink::default();

        let ctx = ExecutionContext::new()
            .with_repro_mode(ReproMode::Strict)
            .with_progress_sink(&progress)
            .with_telemetry_sink(&telemetry);

        assert_eq!(ctx.repro_mode, ReproMode::Strict);
        assert!(ctx.progress.is_some());
        assert!(ctx.telemetry.is_some());
    }

    #[test]
    fn report_progress_clamps_and_ignores_non_finite_values() {
        let progress = MockProgressSink::default();
        let ctx = ExecutionContext::new().with_progress_sink(&progress);

        ctx.report_progress(-0.2);
        ctx.report_progress(0.25);
        ctx.report_progress(1.2);
        ctx.report_progress(f32::NAN);
        ctx.report_progress(f32::INFINITY);

        let got = progress
            .values
            .lock()
            .expect("progress values should lock")
            .clone();
        assert_eq!(got, vec![0.0, 0.25, 1.0]);
    }

    #[test]
    fn hooks_are_noops_without_sinks() {
        let ctx = ExecutionContext::new();
        ctx.report_progress(0.5);
        ctx.record_scalar("engine.spectral.selected_order", 3.0);
        ctx.record_degradation(&Degradation::EigenRankReduced {
            requested: 6,
            available: 2,
        });
    }

    #[test]
    fn telemetry_sink_receives_scalars_and_degradations() {
        let telemetry = MockTelemetrySink::default();
        let ctx = ExecutionContext::new().with_telemetry_sink(&telemetry);

        ctx.record_scalar("engine.spectral.selected_order", 3.0);
        ctx.record_degradation(&Degradation::UnknownMethod {
            requested: "foo".to_string(),
        });

        let scalars = telemetry
            .values
            .lock()
            .expect("telemetry values should lock")
            .clone();
        assert_eq!(scalars, vec![("engine.spectral.selected_order", 3.0)]);
        let events = telemetry
            .events
            .lock()
            .expect("events should lock")
            .clone();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "unknown_method");
    }
}
