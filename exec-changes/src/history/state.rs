//! Execution state snapshots compared during change resolution.

use super::{
    FileCollectionFingerprint, ImplementationSnapshot, InputFileProperties, OutputFileProperties,
    ValueSnapshot,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Snapshot of a unit of work's inputs and current output state, taken
/// immediately before an execution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeExecutionState {
    /// Implementation of the work itself.
    pub implementation: ImplementationSnapshot,
    /// Implementations of additional actions attached to the work.
    #[serde(default)]
    pub additional_implementations: Vec<ImplementationSnapshot>,
    /// Non-file input property values.
    #[serde(default)]
    pub input_properties: BTreeMap<String, ValueSnapshot>,
    /// Input file properties.
    #[serde(default)]
    pub input_file_properties: InputFileProperties,
    /// Output file properties as found on disk before execution.
    #[serde(default)]
    pub output_file_properties: OutputFileProperties,
}

impl BeforeExecutionState {
    /// Creates a snapshot with no properties.
    #[must_use]
    pub fn new(implementation: ImplementationSnapshot) -> Self {
        Self {
            implementation,
            additional_implementations: Vec::new(),
            input_properties: BTreeMap::new(),
            input_file_properties: InputFileProperties::new(),
            output_file_properties: OutputFileProperties::new(),
        }
    }

    /// Adds an additional action implementation.
    #[must_use]
    pub fn with_additional_implementation(mut self, implementation: ImplementationSnapshot) -> Self {
        self.additional_implementations.push(implementation);
        self
    }

    /// Adds a non-file input property.
    #[must_use]
    pub fn with_input_property(mut self, name: impl Into<String>, value: ValueSnapshot) -> Self {
        self.input_properties.insert(name.into(), value);
        self
    }

    /// Adds an input file property.
    #[must_use]
    pub fn with_input_file_property(
        mut self,
        name: impl Into<String>,
        fingerprint: FileCollectionFingerprint,
    ) -> Self {
        self.input_file_properties.insert(name.into(), fingerprint);
        self
    }

    /// Adds an output file property.
    #[must_use]
    pub fn with_output_file_property(
        mut self,
        name: impl Into<String>,
        fingerprint: FileCollectionFingerprint,
    ) -> Self {
        self.output_file_properties.insert(name.into(), fingerprint);
        self
    }

    /// Returns the input file properties.
    #[must_use]
    pub fn input_file_properties(&self) -> &InputFileProperties {
        &self.input_file_properties
    }
}

/// Where a recorded execution came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginMetadata {
    /// Build invocation that produced the recorded outputs.
    pub build_invocation_id: Uuid,
    /// How long that execution took.
    pub execution_time_ms: u64,
    /// When the record was written.
    pub recorded_at: DateTime<Utc>,
}

impl OriginMetadata {
    /// Creates origin metadata for a fresh build invocation recorded now.
    #[must_use]
    pub fn new(execution_time_ms: u64) -> Self {
        Self {
            build_invocation_id: Uuid::new_v4(),
            execution_time_ms,
            recorded_at: Utc::now(),
        }
    }

    /// Creates origin metadata for a known build invocation.
    #[must_use]
    pub fn with_id(build_invocation_id: Uuid, execution_time_ms: u64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            build_invocation_id,
            execution_time_ms,
            recorded_at,
        }
    }
}

/// The recorded state of the last execution of the same unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AfterPreviousExecutionState {
    /// Implementation of the work when it last executed.
    pub implementation: ImplementationSnapshot,
    /// Implementations of additional actions when it last executed.
    #[serde(default)]
    pub additional_implementations: Vec<ImplementationSnapshot>,
    /// Non-file input property values of the last execution.
    #[serde(default)]
    pub input_properties: BTreeMap<String, ValueSnapshot>,
    /// Input file properties of the last execution.
    #[serde(default)]
    pub input_file_properties: InputFileProperties,
    /// Output file properties as produced by the last execution.
    #[serde(default)]
    pub output_file_properties: OutputFileProperties,
    /// Whether the last execution succeeded.
    pub successful: bool,
    /// Origin of the recorded execution.
    pub origin: OriginMetadata,
}

impl AfterPreviousExecutionState {
    /// Creates a successful execution record with no properties.
    #[must_use]
    pub fn new(implementation: ImplementationSnapshot, origin: OriginMetadata) -> Self {
        Self {
            implementation,
            additional_implementations: Vec::new(),
            input_properties: BTreeMap::new(),
            input_file_properties: InputFileProperties::new(),
            output_file_properties: OutputFileProperties::new(),
            successful: true,
            origin,
        }
    }

    /// Records what an execution started from `before` produced.
    ///
    /// The inputs are taken from `before`; `outputs` are the outputs as
    /// fingerprinted after execution.
    #[must_use]
    pub fn from_execution(
        before: &BeforeExecutionState,
        outputs: OutputFileProperties,
        successful: bool,
        origin: OriginMetadata,
    ) -> Self {
        Self {
            implementation: before.implementation.clone(),
            additional_implementations: before.additional_implementations.clone(),
            input_properties: before.input_properties.clone(),
            input_file_properties: before.input_file_properties.clone(),
            output_file_properties: outputs,
            successful,
            origin,
        }
    }

    /// Adds an additional action implementation.
    #[must_use]
    pub fn with_additional_implementation(mut self, implementation: ImplementationSnapshot) -> Self {
        self.additional_implementations.push(implementation);
        self
    }

    /// Adds a non-file input property.
    #[must_use]
    pub fn with_input_property(mut self, name: impl Into<String>, value: ValueSnapshot) -> Self {
        self.input_properties.insert(name.into(), value);
        self
    }

    /// Adds an input file property.
    #[must_use]
    pub fn with_input_file_property(
        mut self,
        name: impl Into<String>,
        fingerprint: FileCollectionFingerprint,
    ) -> Self {
        self.input_file_properties.insert(name.into(), fingerprint);
        self
    }

    /// Adds an output file property.
    #[must_use]
    pub fn with_output_file_property(
        mut self,
        name: impl Into<String>,
        fingerprint: FileCollectionFingerprint,
    ) -> Self {
        self.output_file_properties.insert(name.into(), fingerprint);
        self
    }

    /// Sets whether the execution succeeded.
    #[must_use]
    pub fn with_successful(mut self, successful: bool) -> Self {
        self.successful = successful;
        self
    }

    /// Returns the input file properties.
    #[must_use]
    pub fn input_file_properties(&self) -> &InputFileProperties {
        &self.input_file_properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{FileFingerprint, FileType, HashCode};

    fn implementation() -> ImplementationSnapshot {
        ImplementationSnapshot::new("org.example.Compile", HashCode::from_hex("c0ffee"))
    }

    fn sources() -> FileCollectionFingerprint {
        FileCollectionFingerprint::empty().with_file(
            "/project/src/Main.java",
            FileFingerprint::new("Main.java", FileType::RegularFile, HashCode::from_hex("01")),
        )
    }

    #[test]
    fn test_origin_with_id_is_reproducible() {
        let id = Uuid::from_u128(7);
        let at = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();

        let origin = OriginMetadata::with_id(id, 12, at);

        assert_eq!(origin, OriginMetadata::with_id(id, 12, at));
        assert_eq!(origin.build_invocation_id, id);
        assert_eq!(origin.execution_time_ms, 12);
        assert_ne!(OriginMetadata::new(12), OriginMetadata::new(12));
    }

    #[test]
    fn test_before_state_builder() {
        let before = BeforeExecutionState::new(implementation())
            .with_input_property("release", ValueSnapshot(HashCode::from_hex("11")))
            .with_input_file_property("sources", sources())
            .with_output_file_property("classes", FileCollectionFingerprint::empty());

        assert_eq!(before.input_file_properties().len(), 1);
        assert!(before.input_properties.contains_key("release"));
        assert!(before.output_file_properties.contains_key("classes"));
    }

    #[test]
    fn test_from_execution_copies_inputs() {
        let before = BeforeExecutionState::new(implementation())
            .with_input_file_property("sources", sources());
        let outputs = OutputFileProperties::from([(
            "classes".to_string(),
            FileCollectionFingerprint::empty(),
        )]);

        let after =
            AfterPreviousExecutionState::from_execution(&before, outputs, true, OriginMetadata::new(42));

        assert_eq!(after.input_file_properties(), before.input_file_properties());
        assert_eq!(after.implementation, before.implementation);
        assert!(after.successful);
        assert_eq!(after.origin.execution_time_ms, 42);
    }

    #[test]
    fn test_after_state_serialization() {
        let after = AfterPreviousExecutionState::new(implementation(), OriginMetadata::new(7))
            .with_input_file_property("sources", sources())
            .with_successful(false);

        let json = serde_json::to_string(&after).unwrap();
        let back: AfterPreviousExecutionState = serde_json::from_str(&json).unwrap();

        assert_eq!(back, after);
    }
}
