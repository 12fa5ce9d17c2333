//! Change detection between the previous and current execution state.

use super::file_changes::compare_collections;
use super::{ExecutionStateChanges, InputFileChanges, PropertyKind};
use crate::config::DetectorConfig;
use crate::errors::ChangeDetectionError;
use crate::history::{
    AfterPreviousExecutionState, BeforeExecutionState, FileCollectionFingerprint,
    ImplementationSnapshot,
};
use crate::work::UnitOfWork;
use std::collections::BTreeMap;

/// Compares two snapshots of a unit of work and describes what changed.
///
/// Implementations must be deterministic: the same snapshots and flag always
/// produce the same result.
#[cfg_attr(test, mockall::automock)]
pub trait ChangeDetector: Send + Sync {
    /// Detects changes since the previous execution.
    ///
    /// When `check_outputs` is set, outputs that diverged from what the
    /// previous execution produced are a reason to rebuild.
    fn detect_changes(
        &self,
        previous: &AfterPreviousExecutionState,
        current: &BeforeExecutionState,
        work: &dyn UnitOfWork,
        check_outputs: bool,
    ) -> Result<ExecutionStateChanges, ChangeDetectionError>;
}

/// Reference change detector.
///
/// Rebuild conditions are checked in a fixed order: failed previous
/// execution, implementation, input values, the set of input file
/// properties, and (when requested) outputs. Only if none of them apply are
/// input files compared one by one.
#[derive(Debug, Clone, Default)]
pub struct DefaultChangeDetector {
    config: DetectorConfig,
}

impl DefaultChangeDetector {
    /// Creates a detector with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detector with the given settings.
    #[must_use]
    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Returns the detector settings.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn limit(&self, mut messages: Vec<String>) -> Vec<String> {
        if self.config.max_reported_changes > 0 {
            messages.truncate(self.config.max_reported_changes);
        }
        messages
    }
}

impl ChangeDetector for DefaultChangeDetector {
    fn detect_changes(
        &self,
        previous: &AfterPreviousExecutionState,
        current: &BeforeExecutionState,
        work: &dyn UnitOfWork,
        check_outputs: bool,
    ) -> Result<ExecutionStateChanges, ChangeDetectionError> {
        validate_properties(&previous.input_file_properties)?;
        validate_properties(&previous.output_file_properties)?;
        validate_properties(&current.input_file_properties)?;
        validate_properties(&current.output_file_properties)?;

        let name = work.display_name();

        let mut reasons = Vec::new();
        if !previous.successful {
            reasons.push("Task has failed previously.".to_string());
        }
        if reasons.is_empty() {
            reasons = implementation_changes(previous, current, &name);
        }
        if reasons.is_empty() {
            reasons = input_value_changes(previous, current, &name);
        }
        if reasons.is_empty() {
            reasons = property_set_changes(
                "Input",
                &previous.input_file_properties,
                &current.input_file_properties,
                &name,
            );
        }
        if reasons.is_empty() && check_outputs {
            reasons = output_changes(previous, current, &name);
        }

        if let Some(reason) = reasons.into_iter().next() {
            return Ok(ExecutionStateChanges::rebuild(
                reason,
                Some(current.input_file_properties.clone()),
            ));
        }

        let mut input_file_changes = InputFileChanges::empty();
        for (property, current_files) in &current.input_file_properties {
            let previous_files = previous
                .input_file_properties
                .get(property)
                .cloned()
                .unwrap_or_default();
            input_file_changes.extend(compare_collections(
                PropertyKind::Input,
                property,
                &previous_files,
                current_files,
            ));
        }

        let messages = self.limit(input_file_changes.iter().map(|c| c.message()).collect());
        Ok(ExecutionStateChanges::incremental(input_file_changes, messages))
    }
}

fn validate_properties(
    properties: &BTreeMap<String, FileCollectionFingerprint>,
) -> Result<(), ChangeDetectionError> {
    for (property, files) in properties {
        if property.is_empty() {
            return Err(ChangeDetectionError::inconsistent_snapshot(
                property,
                "property name is empty",
            ));
        }
        if files.iter().any(|(path, _)| path.is_empty()) {
            return Err(ChangeDetectionError::inconsistent_snapshot(
                property,
                "file entry has an empty path",
            ));
        }
    }
    Ok(())
}

fn implementation_changes(
    previous: &AfterPreviousExecutionState,
    current: &BeforeExecutionState,
    name: &str,
) -> Vec<String> {
    let mut messages = Vec::new();
    if let Some(message) = compare_implementation(&previous.implementation, &current.implementation, name) {
        messages.push(message);
    }

    if current.additional_implementations.iter().any(ImplementationSnapshot::is_unknown_loader) {
        messages.push(format!(
            "One or more additional actions for {name} were loaded with an unknown classloader."
        ));
    } else if previous.additional_implementations != current.additional_implementations {
        messages.push(format!("One or more additional actions for {name} have changed."));
    }
    messages
}

fn compare_implementation(
    previous: &ImplementationSnapshot,
    current: &ImplementationSnapshot,
    name: &str,
) -> Option<String> {
    if previous.type_name != current.type_name {
        return Some(format!(
            "The type of {name} has changed from '{}' to '{}'.",
            previous.type_name, current.type_name
        ));
    }
    if current.is_unknown_loader() {
        return Some(format!("The type of {name} was loaded with an unknown classloader."));
    }
    if previous.is_unknown_loader() {
        return Some(format!(
            "The type of {name} was loaded with an unknown classloader during the previous execution."
        ));
    }
    if previous.class_loader_hash != current.class_loader_hash {
        return Some(format!("Class path of {name} has changed."));
    }
    None
}

fn input_value_changes(
    previous: &AfterPreviousExecutionState,
    current: &BeforeExecutionState,
    name: &str,
) -> Vec<String> {
    let mut messages = Vec::new();
    for (property, value) in &current.input_properties {
        match previous.input_properties.get(property) {
            None => messages.push(format!("Input property '{property}' has been added for {name}")),
            Some(prev) if prev != value => {
                messages.push(format!("Value of input property '{property}' has changed for {name}"));
            }
            Some(_) => {}
        }
    }
    for property in previous.input_properties.keys() {
        if !current.input_properties.contains_key(property) {
            messages.push(format!("Input property '{property}' has been removed for {name}"));
        }
    }
    messages
}

fn property_set_changes(
    kind: &str,
    previous: &BTreeMap<String, FileCollectionFingerprint>,
    current: &BTreeMap<String, FileCollectionFingerprint>,
    name: &str,
) -> Vec<String> {
    let mut messages = Vec::new();
    for property in current.keys() {
        if !previous.contains_key(property) {
            messages.push(format!(
                "{kind} property '{property}' file set has been added for {name}"
            ));
        }
    }
    for property in previous.keys() {
        if !current.contains_key(property) {
            messages.push(format!(
                "{kind} property '{property}' file set has been removed for {name}"
            ));
        }
    }
    messages
}

fn output_changes(
    previous: &AfterPreviousExecutionState,
    current: &BeforeExecutionState,
    name: &str,
) -> Vec<String> {
    let mut messages = property_set_changes(
        "Output",
        &previous.output_file_properties,
        &current.output_file_properties,
        name,
    );
    for (property, current_files) in &current.output_file_properties {
        if let Some(previous_files) = previous.output_file_properties.get(property) {
            messages.extend(
                compare_collections(PropertyKind::Output, property, previous_files, current_files)
                    .iter()
                    .map(super::FileChange::message),
            );
        }
    }
    messages
}
