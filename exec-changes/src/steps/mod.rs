//! Step trait and implementations.
//!
//! Steps are composed into a chain: each step does its local work and then
//! hands a new context to the step it wraps, returning that step's result.

mod resolve_changes;
#[cfg(test)]
mod resolve_changes_tests;

pub use resolve_changes::{ResolveChangesStep, NO_HISTORY};

use crate::errors::ExecutionResult;
use std::fmt::Debug;

/// A step of an incremental execution pipeline.
pub trait Step<C>: Send + Sync {
    /// The result the step produces.
    type Output;

    /// Returns the name of the step.
    fn name(&self) -> &str;

    /// Executes the step.
    fn execute(&self, context: C) -> ExecutionResult<Self::Output>;
}

/// A simple function-based step.
pub struct FnStep<F> {
    name: String,
    func: F,
}

impl<F> FnStep<F> {
    /// Creates a new function-based step.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStep<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}

impl<C, R, F> Step<C> for FnStep<F>
where
    F: Fn(C) -> ExecutionResult<R> + Send + Sync,
{
    type Output = R;

    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, context: C) -> ExecutionResult<R> {
        (self.func)(context)
    }
}

impl<C, S> Step<C> for std::sync::Arc<S>
where
    S: Step<C> + ?Sized,
{
    type Output = S::Output;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&self, context: C) -> ExecutionResult<Self::Output> {
        (**self).execute(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExecutionError;
    use std::sync::Arc;

    #[test]
    fn test_fn_step() {
        let step = FnStep::new("double", |n: u32| -> ExecutionResult<u32> { Ok(n * 2) });

        assert_eq!(step.name(), "double");
        assert_eq!(step.execute(21).unwrap(), 42);
    }

    #[test]
    fn test_fn_step_propagates_errors() {
        let step = FnStep::new("fail", |_: ()| -> ExecutionResult<()> {
            Err(ExecutionError::step("fail", "boom"))
        });

        let err = step.execute(()).unwrap_err();
        assert_eq!(err.to_string(), "Step 'fail' failed: boom");
    }

    #[test]
    fn test_shared_step() {
        let step = Arc::new(FnStep::new("len", |s: String| -> ExecutionResult<usize> { Ok(s.len()) }));

        assert_eq!(Step::<String>::name(&step), "len");
        assert_eq!(step.execute("four".to_string()).unwrap(), 4);
    }
}
