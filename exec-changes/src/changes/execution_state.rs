//! Resolved execution state changes.

use super::InputFileChanges;
use crate::history::InputFileProperties;
use serde::{Deserialize, Serialize};

/// No incremental reuse is possible; the work runs as a full execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildChanges {
    /// Why a rebuild is required.
    pub reason: String,
    /// The current input file properties, when a current snapshot exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file_properties: Option<InputFileProperties>,
}

impl RebuildChanges {
    /// Creates a rebuild outcome.
    #[must_use]
    pub fn new(reason: impl Into<String>, input_file_properties: Option<InputFileProperties>) -> Self {
        Self {
            reason: reason.into(),
            input_file_properties,
        }
    }
}

/// The work may execute incrementally against these changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementalChanges {
    /// Input file changes grouped by property.
    pub input_file_changes: InputFileChanges,
    /// Reportable change messages, possibly truncated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_change_messages: Vec<String>,
}

impl IncrementalChanges {
    /// Creates an incremental outcome.
    #[must_use]
    pub fn new(input_file_changes: InputFileChanges, all_change_messages: Vec<String>) -> Self {
        Self {
            input_file_changes,
            all_change_messages,
        }
    }

    /// Returns true if nothing changed since the previous execution.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_file_changes.is_empty()
    }
}

/// What a change detector concluded for a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStateChanges {
    /// A full rebuild is required.
    Rebuild(RebuildChanges),
    /// Incremental execution against a change set is possible.
    Incremental(IncrementalChanges),
}

impl ExecutionStateChanges {
    /// Creates a rebuild outcome.
    #[must_use]
    pub fn rebuild(reason: impl Into<String>, input_file_properties: Option<InputFileProperties>) -> Self {
        Self::Rebuild(RebuildChanges::new(reason, input_file_properties))
    }

    /// Creates an incremental outcome.
    #[must_use]
    pub fn incremental(input_file_changes: InputFileChanges, all_change_messages: Vec<String>) -> Self {
        Self::Incremental(IncrementalChanges::new(input_file_changes, all_change_messages))
    }

    /// Returns true for the rebuild variant.
    #[must_use]
    pub fn is_rebuild_required(&self) -> bool {
        matches!(self, Self::Rebuild(_))
    }

    /// Messages explaining the outcome.
    #[must_use]
    pub fn change_messages(&self) -> Vec<String> {
        match self {
            Self::Rebuild(rebuild) => vec![rebuild.reason.clone()],
            Self::Incremental(incremental) => incremental.all_change_messages.clone(),
        }
    }

    /// Returns the input file changes, `None` when a rebuild is required.
    #[must_use]
    pub fn input_file_changes(&self) -> Option<&InputFileChanges> {
        match self {
            Self::Rebuild(_) => None,
            Self::Incremental(incremental) => Some(&incremental.input_file_changes),
        }
    }
}

/// The outcome of change resolution for one pipeline run.
///
/// `Untracked` means the work does not take part in incremental tracking for
/// this run; it is distinct from a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedChanges {
    /// No current snapshot exists, so there is nothing to compare.
    Untracked,
    /// A full rebuild is required.
    Rebuild(RebuildChanges),
    /// Incremental execution against a change set is possible.
    Incremental(IncrementalChanges),
}

impl ResolvedChanges {
    /// Returns true if incremental tracking is not engaged.
    #[must_use]
    pub fn is_untracked(&self) -> bool {
        matches!(self, Self::Untracked)
    }

    /// Returns the rebuild outcome, if any.
    #[must_use]
    pub fn rebuild(&self) -> Option<&RebuildChanges> {
        match self {
            Self::Rebuild(rebuild) => Some(rebuild),
            _ => None,
        }
    }

    /// Returns the incremental outcome, if any.
    #[must_use]
    pub fn incremental(&self) -> Option<&IncrementalChanges> {
        match self {
            Self::Incremental(incremental) => Some(incremental),
            _ => None,
        }
    }

    /// Returns the resolved changes, `None` when untracked.
    #[must_use]
    pub fn execution_state_changes(&self) -> Option<ExecutionStateChanges> {
        match self {
            Self::Untracked => None,
            Self::Rebuild(rebuild) => Some(ExecutionStateChanges::Rebuild(rebuild.clone())),
            Self::Incremental(incremental) => {
                Some(ExecutionStateChanges::Incremental(incremental.clone()))
            }
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Untracked => "untracked",
            Self::Rebuild(_) => "rebuild",
            Self::Incremental(_) => "incremental",
        }
    }
}

impl From<ExecutionStateChanges> for ResolvedChanges {
    fn from(changes: ExecutionStateChanges) -> Self {
        match changes {
            ExecutionStateChanges::Rebuild(rebuild) => Self::Rebuild(rebuild),
            ExecutionStateChanges::Incremental(incremental) => Self::Incremental(incremental),
        }
    }
}

impl From<Option<ExecutionStateChanges>> for ResolvedChanges {
    fn from(changes: Option<ExecutionStateChanges>) -> Self {
        changes.map_or(Self::Untracked, Self::from)
    }
}
