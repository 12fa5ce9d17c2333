//! # Exec Changes
//!
//! Change resolution for incremental build execution pipelines.
//!
//! Before a unit of work runs, the pipeline must decide whether it can run
//! incrementally. This crate provides the step that makes that decision:
//!
//! - **Untracked**: no snapshot was taken, incremental tracking is off
//! - **Rebuild**: a forced reason, missing history, or a detected change
//!   that invalidates previous results
//! - **Incremental**: the per-file input changes since the last execution
//!
//! The outcome is attached to the execution context and handed to the next
//! step in the chain.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use exec_changes::prelude::*;
//! use std::sync::Arc;
//!
//! let execute = FnStep::new("execute", |ctx: IncrementalChangesContext| -> ExecutionResult<String> {
//!     Ok(ctx.changes().outcome().to_string())
//! });
//! let step = ResolveChangesStep::new(Arc::new(DefaultChangeDetector::new()), execute);
//!
//! let context = IncrementalContext::new(work)
//!     .with_before_execution_state(before)
//!     .with_after_previous_execution_state(previous);
//! let outcome = step.execute(context)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod changes;
pub mod config;
pub mod context;
pub mod errors;
pub mod history;
pub mod observability;
pub mod steps;
pub mod testing;
pub mod work;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::changes::{
        ChangeDetector, ChangeType, DefaultChangeDetector, ExecutionStateChanges, FileChange,
        IncrementalChanges, InputFileChanges, RebuildChanges, ResolvedChanges,
    };
    pub use crate::config::{DetectorConfig, ExecutionConfig, LogFormat, LoggingConfig};
    pub use crate::context::{IncrementalChangesContext, IncrementalContext, WorkContext};
    pub use crate::errors::{ChangeDetectionError, ExecutionError, ExecutionResult};
    pub use crate::history::{
        AfterPreviousExecutionState, BeforeExecutionState, FileCollectionFingerprint,
        FileFingerprint, FileType, HashCode, ImplementationSnapshot, OriginMetadata,
        ValueSnapshot,
    };
    pub use crate::observability::init_tracing;
    pub use crate::steps::{FnStep, ResolveChangesStep, Step, NO_HISTORY};
    pub use crate::work::{UnitOfWork, WorkDescriptor, WorkIdentity};
}
