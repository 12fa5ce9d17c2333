//! Stable identity for units of work.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a unit of work across executions.
///
/// The identity must be stable from one build to the next, since it is what
/// correlates the history recorded by a previous execution with the snapshot
/// taken before the current one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkIdentity(String);

impl WorkIdentity {
    /// Creates a new work identity.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for WorkIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}
