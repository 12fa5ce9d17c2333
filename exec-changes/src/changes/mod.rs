//! Execution state changes and change detection.
//!
//! This module provides:
//! - The two-variant `ExecutionStateChanges` a detector reports
//! - The three-variant `ResolvedChanges` handed to downstream steps
//! - Per-property file changes
//! - The `ChangeDetector` contract and a reference implementation

mod detector;
mod execution_state;
mod file_changes;

#[cfg(test)]
pub use detector::MockChangeDetector;
pub use detector::{ChangeDetector, DefaultChangeDetector};
pub use execution_state::{ExecutionStateChanges, IncrementalChanges, RebuildChanges, ResolvedChanges};
pub use file_changes::{compare_collections, ChangeType, FileChange, InputFileChanges, PropertyKind};
