//! Error types for change resolution.
//!
//! Change resolution itself never fails: a missing history or a unit of work
//! that is not tracked are ordinary outcomes. Errors only originate from an
//! injected change detector, from a downstream step, or from loading
//! configuration.

use crate::work::WorkIdentity;
use serde_json::json;
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for execution pipeline operations.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The change detector failed while comparing snapshots of a unit of work.
    #[error("Change detection failed for {work}: {source}")]
    ChangeDetection {
        /// The unit of work being resolved.
        work: WorkIdentity,
        /// The detector failure.
        #[source]
        source: ChangeDetectionError,
    },

    /// A pipeline step failed.
    #[error("Step '{step}' failed: {message}")]
    Step {
        /// Name of the failing step.
        step: String,
        /// Failure message.
        message: String,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExecutionError {
    /// Creates a change detection error for a unit of work.
    #[must_use]
    pub fn change_detection(work: WorkIdentity, source: ChangeDetectionError) -> Self {
        Self::ChangeDetection { work, source }
    }

    /// Creates a step failure.
    #[must_use]
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns the unit of work a failure is attributed to, if any.
    #[must_use]
    pub fn work(&self) -> Option<&WorkIdentity> {
        match self {
            Self::ChangeDetection { work, .. } => Some(work),
            _ => None,
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::ChangeDetection { work, source } => {
                map.insert("type".to_string(), json!("ChangeDetectionError"));
                map.insert("work".to_string(), json!(work.as_str()));
                map.insert("cause".to_string(), json!(source.to_string()));
            }
            Self::Step { step, .. } => {
                map.insert("type".to_string(), json!("StepError"));
                map.insert("step".to_string(), json!(step));
            }
            Self::Config(_) => {
                map.insert("type".to_string(), json!("ConfigError"));
            }
            Self::Serialization(_) => {
                map.insert("type".to_string(), json!("SerializationError"));
            }
            Self::Io(_) => {
                map.insert("type".to_string(), json!("IoError"));
            }
        }

        map.insert("message".to_string(), json!(self.to_string()));
        map
    }
}

/// Errors raised by a change detector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeDetectionError {
    /// A snapshot contains an entry that cannot be correlated across executions.
    #[error("Inconsistent snapshot for property '{property}': {reason}")]
    InconsistentSnapshot {
        /// The offending property.
        property: String,
        /// Why the entry is unusable.
        reason: String,
    },

    /// The detector does not support comparing these snapshots.
    #[error("Unsupported comparison: {0}")]
    Unsupported(String),
}

impl ChangeDetectionError {
    /// Creates an inconsistent snapshot error.
    #[must_use]
    pub fn inconsistent_snapshot(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentSnapshot {
            property: property.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for execution pipeline operations.
pub type ExecutionResult<T> = Result<T, ExecutionError>;
