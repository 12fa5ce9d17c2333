//! Per-property file changes.

use crate::history::{FileCollectionFingerprint, FileType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a file changed between two executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// The file did not exist before.
    Added,
    /// The file no longer exists.
    Removed,
    /// The file's content or type changed.
    Modified,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Removed => write!(f, "removed"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

/// Whether a change concerns an input or an output property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Input file property.
    Input,
    /// Output file property.
    Output,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "Input"),
            Self::Output => write!(f, "Output"),
        }
    }
}

/// A single file change within a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Whether the property is an input or output.
    pub kind: PropertyKind,
    /// Property the file belongs to.
    pub property: String,
    /// Absolute path of the file.
    pub path: String,
    /// How it changed.
    pub change_type: ChangeType,
    /// Type of the file after the change (before it, for removals).
    pub file_type: FileType,
}

impl FileChange {
    /// Creates a file change.
    #[must_use]
    pub fn new(
        kind: PropertyKind,
        property: impl Into<String>,
        path: impl Into<String>,
        change_type: ChangeType,
        file_type: FileType,
    ) -> Self {
        Self {
            kind,
            property: property.into(),
            path: path.into(),
            change_type,
            file_type,
        }
    }

    /// Human-readable description of the change.
    #[must_use]
    pub fn message(&self) -> String {
        let verb = match self.change_type {
            ChangeType::Added => "has been added",
            ChangeType::Removed => "has been removed",
            ChangeType::Modified => "has changed",
        };
        format!(
            "{} property '{}' {} {} {}.",
            self.kind, self.property, self.file_type, self.path, verb
        )
    }
}

/// Compares two fingerprints of the same property file by file.
///
/// A file whose type becomes `Missing` is reported removed, one whose type
/// was `Missing` is reported added.
#[must_use]
pub fn compare_collections(
    kind: PropertyKind,
    property: &str,
    previous: &FileCollectionFingerprint,
    current: &FileCollectionFingerprint,
) -> Vec<FileChange> {
    let mut changes = Vec::new();

    for (path, prev) in previous.iter() {
        match current.get(path) {
            None => {
                if prev.file_type != FileType::Missing {
                    changes.push(FileChange::new(kind, property, path, ChangeType::Removed, prev.file_type));
                }
            }
            Some(cur) if prev.is_content_up_to_date(cur) => {}
            Some(cur) => {
                let change = match (prev.file_type, cur.file_type) {
                    (FileType::Missing, _) => FileChange::new(kind, property, path, ChangeType::Added, cur.file_type),
                    (_, FileType::Missing) => {
                        FileChange::new(kind, property, path, ChangeType::Removed, prev.file_type)
                    }
                    _ => FileChange::new(kind, property, path, ChangeType::Modified, cur.file_type),
                };
                changes.push(change);
            }
        }
    }

    for (path, cur) in current.iter() {
        if previous.get(path).is_none() && cur.file_type != FileType::Missing {
            changes.push(FileChange::new(kind, property, path, ChangeType::Added, cur.file_type));
        }
    }

    changes
}

/// Changes to input files, grouped by property.
///
/// Properties without any change are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputFileChanges {
    by_property: BTreeMap<String, Vec<FileChange>>,
}

impl InputFileChanges {
    /// Creates an empty change set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Records a change.
    pub fn add(&mut self, change: FileChange) {
        self.by_property
            .entry(change.property.clone())
            .or_default()
            .push(change);
    }

    /// Records every change in `changes`.
    pub fn extend(&mut self, changes: impl IntoIterator<Item = FileChange>) {
        for change in changes {
            self.add(change);
        }
    }

    /// Returns true if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_property.is_empty()
    }

    /// Returns the total number of file changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_property.values().map(Vec::len).sum()
    }

    /// Returns the changes of a single property.
    #[must_use]
    pub fn for_property(&self, property: &str) -> &[FileChange] {
        self.by_property.get(property).map_or(&[], Vec::as_slice)
    }

    /// Returns the names of properties with at least one change.
    pub fn changed_properties(&self) -> impl Iterator<Item = &str> {
        self.by_property.keys().map(String::as_str)
    }

    /// Iterates over every change, ordered by property then detection order.
    pub fn iter(&self) -> impl Iterator<Item = &FileChange> {
        self.by_property.values().flatten()
    }

    /// Iterates over changes of the given type.
    pub fn of_type(&self, change_type: ChangeType) -> impl Iterator<Item = &FileChange> {
        self.iter().filter(move |c| c.change_type == change_type)
    }

    /// Iterates over added files.
    pub fn added(&self) -> impl Iterator<Item = &FileChange> {
        self.of_type(ChangeType::Added)
    }

    /// Iterates over removed files.
    pub fn removed(&self) -> impl Iterator<Item = &FileChange> {
        self.of_type(ChangeType::Removed)
    }

    /// Iterates over modified files.
    pub fn modified(&self) -> impl Iterator<Item = &FileChange> {
        self.of_type(ChangeType::Modified)
    }
}

impl FromIterator<FileChange> for InputFileChanges {
    fn from_iter<T: IntoIterator<Item = FileChange>>(iter: T) -> Self {
        let mut changes = Self::empty();
        changes.extend(iter);
        changes
    }
}
