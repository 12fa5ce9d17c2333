//! Immutable contexts threaded through incremental execution steps.

use crate::changes::ResolvedChanges;
use crate::history::{AfterPreviousExecutionState, BeforeExecutionState};
use crate::work::UnitOfWork;
use std::sync::Arc;

/// Read access shared by every incremental execution context.
pub trait WorkContext {
    /// The unit of work being executed.
    fn work(&self) -> &Arc<dyn UnitOfWork>;

    /// Snapshot taken before this execution, if the work is tracked.
    fn before_execution_state(&self) -> Option<&BeforeExecutionState>;

    /// Record of the previous execution, if history exists.
    fn after_previous_execution_state(&self) -> Option<&AfterPreviousExecutionState>;

    /// Externally forced reason to rebuild, if any.
    fn rebuild_reason(&self) -> Option<&str>;
}

/// Context consumed by change resolution.
#[derive(Debug, Clone)]
pub struct IncrementalContext {
    work: Arc<dyn UnitOfWork>,
    before_execution_state: Option<BeforeExecutionState>,
    after_previous_execution_state: Option<AfterPreviousExecutionState>,
    rebuild_reason: Option<String>,
}

impl IncrementalContext {
    /// Creates a context with no snapshots and no forced rebuild.
    #[must_use]
    pub fn new(work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            work,
            before_execution_state: None,
            after_previous_execution_state: None,
            rebuild_reason: None,
        }
    }

    /// Sets the snapshot taken before execution.
    #[must_use]
    pub fn with_before_execution_state(mut self, state: BeforeExecutionState) -> Self {
        self.before_execution_state = Some(state);
        self
    }

    /// Sets the record of the previous execution.
    #[must_use]
    pub fn with_after_previous_execution_state(mut self, state: AfterPreviousExecutionState) -> Self {
        self.after_previous_execution_state = Some(state);
        self
    }

    /// Forces a rebuild for the given reason.
    #[must_use]
    pub fn with_rebuild_reason(mut self, reason: impl Into<String>) -> Self {
        self.rebuild_reason = Some(reason.into());
        self
    }
}

impl WorkContext for IncrementalContext {
    fn work(&self) -> &Arc<dyn UnitOfWork> {
        &self.work
    }

    fn before_execution_state(&self) -> Option<&BeforeExecutionState> {
        self.before_execution_state.as_ref()
    }

    fn after_previous_execution_state(&self) -> Option<&AfterPreviousExecutionState> {
        self.after_previous_execution_state.as_ref()
    }

    fn rebuild_reason(&self) -> Option<&str> {
        self.rebuild_reason.as_deref()
    }
}

/// Context produced by change resolution.
///
/// Carries every field of the [`IncrementalContext`] it was built from,
/// unchanged, plus the resolved changes.
#[derive(Debug, Clone)]
pub struct IncrementalChangesContext {
    work: Arc<dyn UnitOfWork>,
    before_execution_state: Option<BeforeExecutionState>,
    after_previous_execution_state: Option<AfterPreviousExecutionState>,
    rebuild_reason: Option<String>,
    changes: ResolvedChanges,
}

impl IncrementalChangesContext {
    /// Builds the downstream context from `context` and the resolved changes.
    #[must_use]
    pub fn augment(context: IncrementalContext, changes: ResolvedChanges) -> Self {
        // Exhaustive so that a new field cannot be dropped silently.
        let IncrementalContext {
            work,
            before_execution_state,
            after_previous_execution_state,
            rebuild_reason,
        } = context;

        Self {
            work,
            before_execution_state,
            after_previous_execution_state,
            rebuild_reason,
            changes,
        }
    }

    /// The resolved changes for this run.
    #[must_use]
    pub fn changes(&self) -> &ResolvedChanges {
        &self.changes
    }
}

impl WorkContext for IncrementalChangesContext {
    fn work(&self) -> &Arc<dyn UnitOfWork> {
        &self.work
    }

    fn before_execution_state(&self) -> Option<&BeforeExecutionState> {
        self.before_execution_state.as_ref()
    }

    fn after_previous_execution_state(&self) -> Option<&AfterPreviousExecutionState> {
        self.after_previous_execution_state.as_ref()
    }

    fn rebuild_reason(&self) -> Option<&str> {
        self.rebuild_reason.as_deref()
    }
}
