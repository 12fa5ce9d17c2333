//! Units of work tracked by incremental execution.

mod identity;

pub use identity::WorkIdentity;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A schedulable, incrementally trackable piece of work.
///
/// Implementations are owned by the caller of the pipeline and are read-only
/// to change resolution.
pub trait UnitOfWork: Send + Sync + Debug {
    /// Returns the stable identity of this work.
    fn identity(&self) -> &WorkIdentity;

    /// Returns a human-readable name used in change messages.
    fn display_name(&self) -> String {
        self.identity().to_string()
    }

    /// Whether the outputs of this work may legitimately overlap with the
    /// outputs of another unit of work.
    fn allows_overlapping_outputs(&self) -> bool {
        false
    }
}

/// A plain description of a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDescriptor {
    /// Stable identity.
    pub identity: WorkIdentity,
    /// Optional display name, defaults to the identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Whether outputs may overlap with another work's outputs.
    #[serde(default)]
    pub allows_overlapping_outputs: bool,
}

impl WorkDescriptor {
    /// Creates a new work descriptor.
    #[must_use]
    pub fn new(identity: impl Into<WorkIdentity>) -> Self {
        Self {
            identity: identity.into(),
            display_name: None,
            allows_overlapping_outputs: false,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets whether outputs may overlap.
    #[must_use]
    pub fn with_overlapping_outputs(mut self, allowed: bool) -> Self {
        self.allows_overlapping_outputs = allowed;
        self
    }
}

impl UnitOfWork for WorkDescriptor {
    fn identity(&self) -> &WorkIdentity {
        &self.identity
    }

    fn display_name(&self) -> String {
        self.display_name
            .clone()
            .unwrap_or_else(|| self.identity.to_string())
    }

    fn allows_overlapping_outputs(&self) -> bool {
        self.allows_overlapping_outputs
    }
}
