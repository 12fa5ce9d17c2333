//! Mock steps and change detectors for testing.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::changes::{ChangeDetector, ExecutionStateChanges, ResolvedChanges};
use crate::context::IncrementalChangesContext;
use crate::errors::{ChangeDetectionError, ExecutionError, ExecutionResult};
use crate::history::{AfterPreviousExecutionState, BeforeExecutionState};
use crate::steps::Step;
use crate::work::{UnitOfWork, WorkIdentity};

/// A step that records every context it receives and returns a fixed value.
#[derive(Debug)]
pub struct RecordingStep<R> {
    name: String,
    output: R,
    contexts: Mutex<Vec<IncrementalChangesContext>>,
}

impl<R: Clone> RecordingStep<R> {
    /// Creates a recording step returning `output`.
    #[must_use]
    pub fn new(name: impl Into<String>, output: R) -> Self {
        Self {
            name: name.into(),
            output,
            contexts: Mutex::new(Vec::new()),
        }
    }

    /// Returns the number of times the step was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.contexts.lock().len()
    }

    /// Returns the contexts from each call.
    #[must_use]
    pub fn recorded_contexts(&self) -> Vec<IncrementalChangesContext> {
        self.contexts.lock().clone()
    }

    /// Returns the most recent context, if any.
    #[must_use]
    pub fn last_context(&self) -> Option<IncrementalChangesContext> {
        self.contexts.lock().last().cloned()
    }

    /// Returns the changes seen by the most recent call, if any.
    #[must_use]
    pub fn last_changes(&self) -> Option<ResolvedChanges> {
        self.contexts.lock().last().map(|ctx| ctx.changes().clone())
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.contexts.lock().clear();
    }
}

impl<R: Clone + Send + Sync> Step<IncrementalChangesContext> for RecordingStep<R> {
    type Output = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: IncrementalChangesContext) -> ExecutionResult<R> {
        self.contexts.lock().push(context);
        Ok(self.output.clone())
    }
}

/// A step that always fails.
#[derive(Debug)]
pub struct FailingStep {
    name: String,
    message: String,
}

impl FailingStep {
    /// Creates a failing step.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl Step<IncrementalChangesContext> for FailingStep {
    type Output = ();

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, _context: IncrementalChangesContext) -> ExecutionResult<()> {
        Err(ExecutionError::step(&self.name, &self.message))
    }
}

/// One recorded call to a change detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorCall {
    /// The previous execution record.
    pub previous: AfterPreviousExecutionState,
    /// The current snapshot.
    pub current: BeforeExecutionState,
    /// Identity of the unit of work.
    pub work: WorkIdentity,
    /// The `check_outputs` flag.
    pub check_outputs: bool,
}

/// A change detector returning a fixed result and recording its calls.
#[derive(Debug)]
pub struct RecordingChangeDetector {
    result: Result<ExecutionStateChanges, ChangeDetectionError>,
    calls: Mutex<Vec<DetectorCall>>,
}

impl RecordingChangeDetector {
    /// Creates a detector that always reports `changes`.
    #[must_use]
    pub fn returning(changes: ExecutionStateChanges) -> Self {
        Self {
            result: Ok(changes),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a detector that always fails with `error`.
    #[must_use]
    pub fn failing(error: ChangeDetectionError) -> Self {
        Self {
            result: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Wraps the detector for injection into a step.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Returns the recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<DetectorCall> {
        self.calls.lock().clone()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl ChangeDetector for RecordingChangeDetector {
    fn detect_changes(
        &self,
        previous: &AfterPreviousExecutionState,
        current: &BeforeExecutionState,
        work: &dyn UnitOfWork,
        check_outputs: bool,
    ) -> Result<ExecutionStateChanges, ChangeDetectionError> {
        self.calls.lock().push(DetectorCall {
            previous: previous.clone(),
            current: current.clone(),
            work: work.identity().clone(),
            check_outputs,
        });
        self.result.clone()
    }
}
