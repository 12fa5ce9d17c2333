//! Snapshot fixtures for change resolution tests.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::context::IncrementalContext;
use crate::history::{
    AfterPreviousExecutionState, BeforeExecutionState, FileCollectionFingerprint, FileFingerprint,
    FileType, HashCode, ImplementationSnapshot, OriginMetadata,
};
use crate::work::{UnitOfWork, WorkDescriptor};
use uuid::Uuid;

/// Hashes `content` the way fixtures fingerprint files.
#[must_use]
pub fn content_hash(content: impl AsRef<[u8]>) -> HashCode {
    HashCode::from_hex(hex::encode(Sha256::digest(content.as_ref())))
}

/// Fingerprint of a regular file with the given content.
#[must_use]
pub fn regular_file(normalized_path: &str, content: &str) -> FileFingerprint {
    FileFingerprint::new(normalized_path, FileType::RegularFile, content_hash(content))
}

/// A file collection built from `(absolute path, content)` pairs.
///
/// The normalized path of each entry is its file name.
#[must_use]
pub fn files(entries: &[(&str, &str)]) -> FileCollectionFingerprint {
    entries
        .iter()
        .map(|(path, content)| {
            let name = path.rsplit('/').next().unwrap_or(*path);
            ((*path).to_string(), regular_file(name, content))
        })
        .collect()
}

/// A unit of work that does not allow overlapping outputs.
#[must_use]
pub fn test_work(identity: &str) -> Arc<dyn UnitOfWork> {
    Arc::new(WorkDescriptor::new(identity))
}

/// A unit of work that allows overlapping outputs.
#[must_use]
pub fn overlapping_work(identity: &str) -> Arc<dyn UnitOfWork> {
    Arc::new(WorkDescriptor::new(identity).with_overlapping_outputs(true))
}

/// Builder for consistent before/after snapshot pairs.
#[derive(Debug, Clone)]
pub struct SnapshotFixture {
    implementation: ImplementationSnapshot,
    inputs: Vec<(String, FileCollectionFingerprint)>,
    outputs: Vec<(String, FileCollectionFingerprint)>,
}

impl Default for SnapshotFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotFixture {
    /// Creates a fixture with a fixed implementation and no properties.
    #[must_use]
    pub fn new() -> Self {
        Self {
            implementation: ImplementationSnapshot::new(
                "org.example.TestWork",
                content_hash("test-classpath"),
            ),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Adds an input file property.
    #[must_use]
    pub fn input(mut self, property: impl Into<String>, files: FileCollectionFingerprint) -> Self {
        self.inputs.push((property.into(), files));
        self
    }

    /// Adds an output file property.
    #[must_use]
    pub fn output(mut self, property: impl Into<String>, files: FileCollectionFingerprint) -> Self {
        self.outputs.push((property.into(), files));
        self
    }

    /// Builds the snapshot taken before execution.
    #[must_use]
    pub fn before(&self) -> BeforeExecutionState {
        let state = self
            .inputs
            .iter()
            .fold(BeforeExecutionState::new(self.implementation.clone()), |state, (name, fp)| {
                state.with_input_file_property(name.clone(), fp.clone())
            });
        self.outputs.iter().fold(state, |state, (name, fp)| {
            state.with_output_file_property(name.clone(), fp.clone())
        })
    }

    /// Builds a successful record of an execution started from the same snapshot.
    ///
    /// The record is reproducible: repeated calls compare equal.
    #[must_use]
    pub fn after_previous(&self) -> AfterPreviousExecutionState {
        let before = self.before();
        AfterPreviousExecutionState::from_execution(
            &before,
            before.output_file_properties.clone(),
            true,
            OriginMetadata::with_id(Uuid::nil(), 100, DateTime::<Utc>::UNIX_EPOCH),
        )
    }

    /// Builds a context with both snapshots present.
    #[must_use]
    pub fn context(&self, work: Arc<dyn UnitOfWork>) -> IncrementalContext {
        IncrementalContext::new(work)
            .with_before_execution_state(self.before())
            .with_after_previous_execution_state(self.after_previous())
    }
}
