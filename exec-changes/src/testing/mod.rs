//! Testing utilities for incremental execution steps.
//!
//! This module provides:
//! - Recording steps and change detectors
//! - Snapshot fixtures
//! - Assertions for resolved changes

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_incremental, assert_rebuild, assert_untracked};
pub use fixtures::{
    content_hash, files, overlapping_work, regular_file, test_work, SnapshotFixture,
};
pub use mocks::{DetectorCall, FailingStep, RecordingChangeDetector, RecordingStep};
