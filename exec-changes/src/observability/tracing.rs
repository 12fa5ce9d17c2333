//! Span attributes for change resolution.
//!
//! Attributes follow OpenTelemetry naming so they can be attached to
//! exported spans or logged as structured fields.

use crate::changes::ResolvedChanges;
use crate::work::WorkIdentity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

/// Span attributes for one change resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionSpanAttributes {
    /// Identity of the unit of work.
    pub work: String,
    /// `untracked`, `rebuild` or `incremental`.
    pub outcome: Option<String>,
    /// Rebuild reason, if a rebuild was resolved.
    pub rebuild_reason: Option<String>,
    /// Number of input file changes for incremental outcomes.
    pub change_count: Option<usize>,
    /// Whether outputs were compared against history.
    pub check_outputs: Option<bool>,
    /// Duration in milliseconds.
    pub duration_ms: Option<f64>,
}

impl ResolutionSpanAttributes {
    /// Creates attributes for a unit of work.
    #[must_use]
    pub fn new(work: &WorkIdentity) -> Self {
        Self {
            work: work.to_string(),
            ..Default::default()
        }
    }

    /// Creates attributes describing a resolved outcome.
    #[must_use]
    pub fn from_changes(work: &WorkIdentity, changes: &ResolvedChanges) -> Self {
        let mut attrs = Self::new(work);
        attrs.outcome = Some(changes.outcome().to_string());
        match changes {
            ResolvedChanges::Untracked => {}
            ResolvedChanges::Rebuild(rebuild) => attrs.rebuild_reason = Some(rebuild.reason.clone()),
            ResolvedChanges::Incremental(incremental) => {
                attrs.change_count = Some(incremental.input_file_changes.len());
            }
        }
        attrs
    }

    /// Sets whether outputs were checked.
    #[must_use]
    pub fn with_check_outputs(mut self, check_outputs: bool) -> Self {
        self.check_outputs = Some(check_outputs);
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Converts to OpenTelemetry attributes.
    #[must_use]
    pub fn to_otel_attributes(&self) -> HashMap<String, String> {
        let mut attrs = HashMap::new();

        attrs.insert("work.identity".to_string(), self.work.clone());

        if let Some(ref v) = self.outcome {
            attrs.insert("changes.outcome".to_string(), v.clone());
        }
        if let Some(ref v) = self.rebuild_reason {
            attrs.insert("changes.rebuild_reason".to_string(), v.clone());
        }
        if let Some(v) = self.change_count {
            attrs.insert("changes.count".to_string(), v.to_string());
        }
        if let Some(v) = self.check_outputs {
            attrs.insert("changes.check_outputs".to_string(), v.to_string());
        }
        if let Some(v) = self.duration_ms {
            attrs.insert("changes.duration_ms".to_string(), v.to_string());
        }

        attrs
    }
}

/// Simple span timing helper.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
    name: String,
}

impl SpanTimer {
    /// Starts a new span timer.
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns the span name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Finishes the span and returns the duration.
    #[must_use]
    pub fn finish(self) -> f64 {
        self.elapsed_ms()
    }
}
