// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use sseg_core::{Degradation, ExecutionContext};

/// Notes, warnings and degradation events gathered during one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunLog {
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
    pub degradations: Vec<Degradation>,
}

impl RunLog {
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Records a fallback, mirrors it as a warning and forwards it to telemetry.
    pub fn degrade(&mut self, ctx: &ExecutionContext<'_>, event: Degradation) {
        ctx.record_degradation(&event);
        self.warnings.push(describe(&event));
        self.degradations.push(event);
    }
}

fn describe(event: &Degradation) -> String {
    match event {
        Degradation::UnknownMethod { requested } => {
            format!("method '{requested}' is unknown; using symbol_spectral")
        }
        Degradation::BoundaryWindowExhausted { required, found } => format!(
            "boundary window relaxation exhausted: required {required} boundaries, found {found}"
        ),
        Degradation::EigenRankReduced {
            requested,
            available,
        } => format!("eigen-embedding rank reduced from {requested} to {available}"),
        Degradation::ClusterCountClamped { requested, segments } => format!(
            "segment labeling requested {requested} clusters but only {segments} segments exist"
        ),
        Degradation::HierarchyCollapsed { rank } => format!(
            "embedding rank {rank} is below the smallest hierarchy order; returning one level"
        ),
    }
}
