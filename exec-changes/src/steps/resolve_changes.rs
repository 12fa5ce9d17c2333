//! Resolves what changed since the previous execution of a unit of work.

use super::Step;
use crate::changes::{ChangeDetector, ExecutionStateChanges, ResolvedChanges};
use crate::context::{IncrementalChangesContext, IncrementalContext, WorkContext};
use crate::errors::{ExecutionError, ExecutionResult};
use crate::observability::{ResolutionSpanAttributes, SpanTimer};
use std::fmt::{self, Debug};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Rebuild reason used when a tracked unit of work has no history.
pub const NO_HISTORY: &str = "No history is available.";

/// Computes the changes for one pipeline run and delegates with an
/// augmented context.
///
/// The first matching rule wins:
///
/// 1. A forced rebuild reason produces a rebuild with that reason.
/// 2. Without a snapshot taken before execution the work is untracked.
/// 3. Without history the work is rebuilt with [`NO_HISTORY`].
/// 4. Otherwise the detector decides, checking outputs unless the work
///    allows overlapping outputs.
///
/// The delegate's result is returned unmodified.
pub struct ResolveChangesStep<D> {
    change_detector: Arc<dyn ChangeDetector>,
    delegate: D,
}

impl<D> ResolveChangesStep<D> {
    /// Creates a new change resolution step.
    pub fn new(change_detector: Arc<dyn ChangeDetector>, delegate: D) -> Self {
        Self {
            change_detector,
            delegate,
        }
    }

    /// Returns the wrapped step.
    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    /// Resolves the changes for `context` without delegating.
    pub fn resolve(&self, context: &IncrementalContext) -> ExecutionResult<ResolvedChanges> {
        self.resolve_branch(context).map(|(changes, _)| changes)
    }

    /// Resolves the changes for `context` and describes the resolution.
    ///
    /// `check_outputs` is only set when the detector ran.
    pub fn resolve_with_attributes(
        &self,
        context: &IncrementalContext,
    ) -> ExecutionResult<(ResolvedChanges, ResolutionSpanAttributes)> {
        let timer = SpanTimer::start("resolve-changes");
        let (changes, check_outputs) = self.resolve_branch(context)?;
        let mut attributes = ResolutionSpanAttributes::from_changes(context.work().identity(), &changes);
        if let Some(check_outputs) = check_outputs {
            attributes = attributes.with_check_outputs(check_outputs);
        }
        Ok((changes, attributes.with_duration_ms(timer.finish())))
    }

    /// Returns the changes and, if the detector was consulted, the
    /// `check_outputs` flag it was given.
    fn resolve_branch(
        &self,
        context: &IncrementalContext,
    ) -> ExecutionResult<(ResolvedChanges, Option<bool>)> {
        let work = context.work();
        let before = context.before_execution_state();

        if let Some(reason) = context.rebuild_reason() {
            debug!(work = %work.identity(), reason, "Forced rebuild");
            let inputs = before.map(|state| state.input_file_properties().clone());
            return Ok((ExecutionStateChanges::rebuild(reason, inputs).into(), None));
        }

        let Some(before) = before else {
            debug!(work = %work.identity(), "No execution state snapshot, incremental tracking disabled");
            return Ok((ResolvedChanges::Untracked, None));
        };

        let Some(previous) = context.after_previous_execution_state() else {
            debug!(work = %work.identity(), reason = NO_HISTORY, "Rebuilding without history");
            let changes =
                ExecutionStateChanges::rebuild(NO_HISTORY, Some(before.input_file_properties().clone()));
            return Ok((changes.into(), None));
        };

        let check_outputs = !work.allows_overlapping_outputs();
        let changes = self
            .change_detector
            .detect_changes(previous, before, &**work, check_outputs)
            .map_err(|source| {
                warn!(work = %work.identity(), error = %source, "Change detection failed");
                ExecutionError::change_detection(work.identity().clone(), source)
            })?;

        debug!(
            work = %work.identity(),
            check_outputs,
            rebuild = changes.is_rebuild_required(),
            "Detected changes since previous execution"
        );
        Ok((changes.into(), Some(check_outputs)))
    }
}

impl<D> Debug for ResolveChangesStep<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveChangesStep").finish_non_exhaustive()
    }
}

impl<D> Step<IncrementalContext> for ResolveChangesStep<D>
where
    D: Step<IncrementalChangesContext>,
{
    type Output = D::Output;

    fn name(&self) -> &str {
        "resolve-changes"
    }

    fn execute(&self, context: IncrementalContext) -> ExecutionResult<D::Output> {
        let span = tracing::debug_span!("resolve_changes", work = %context.work().identity());
        let _entered = span.enter();

        let (changes, attributes) = self.resolve_with_attributes(&context)?;
        trace!(
            attributes = ?attributes.to_otel_attributes(),
            delegate = self.delegate.name(),
            "Delegating with resolved changes"
        );
        self.delegate
            .execute(IncrementalChangesContext::augment(context, changes))
    }
}
