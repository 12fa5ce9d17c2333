//! Fingerprint value types produced by the snapshotting subsystem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// An opaque content hash, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashCode(String);

impl HashCode {
    /// Creates a hash code from a hex string.
    #[must_use]
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into().to_ascii_lowercase())
    }

    /// Returns the hex representation.
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of filesystem entry a fingerprint was taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// A regular file.
    RegularFile,
    /// A directory.
    Directory,
    /// Nothing exists at the path.
    Missing,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegularFile => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
            Self::Missing => write!(f, "missing"),
        }
    }
}

/// Fingerprint of a single filesystem location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Path as normalized by the fingerprinting strategy (e.g. relative).
    pub normalized_path: String,
    /// Type of the entry.
    pub file_type: FileType,
    /// Hash of the content, or of the metadata for directories.
    pub content_hash: HashCode,
}

impl FileFingerprint {
    /// Creates a new file fingerprint.
    #[must_use]
    pub fn new(
        normalized_path: impl Into<String>,
        file_type: FileType,
        content_hash: HashCode,
    ) -> Self {
        Self {
            normalized_path: normalized_path.into(),
            file_type,
            content_hash,
        }
    }

    /// Whether this fingerprint describes the same state as `other`.
    #[must_use]
    pub fn is_content_up_to_date(&self, other: &Self) -> bool {
        self.file_type == other.file_type && self.content_hash == other.content_hash
    }
}

/// Fingerprints of a file collection, keyed by absolute path.
///
/// Ordered so that every comparison visits files in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileCollectionFingerprint {
    fingerprints: BTreeMap<String, FileFingerprint>,
}

impl FileCollectionFingerprint {
    /// Creates an empty fingerprint.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a file fingerprint under its absolute path.
    #[must_use]
    pub fn with_file(mut self, absolute_path: impl Into<String>, fingerprint: FileFingerprint) -> Self {
        self.fingerprints.insert(absolute_path.into(), fingerprint);
        self
    }

    /// Returns the fingerprint for an absolute path.
    #[must_use]
    pub fn get(&self, absolute_path: &str) -> Option<&FileFingerprint> {
        self.fingerprints.get(absolute_path)
    }

    /// Returns the number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// Returns true if the collection has no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// Iterates over `(absolute path, fingerprint)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileFingerprint)> {
        self.fingerprints.iter().map(|(path, fp)| (path.as_str(), fp))
    }
}

impl FromIterator<(String, FileFingerprint)> for FileCollectionFingerprint {
    fn from_iter<T: IntoIterator<Item = (String, FileFingerprint)>>(iter: T) -> Self {
        Self {
            fingerprints: iter.into_iter().collect(),
        }
    }
}

/// Input file properties keyed by property name.
pub type InputFileProperties = BTreeMap<String, FileCollectionFingerprint>;

/// Output file properties keyed by property name.
pub type OutputFileProperties = BTreeMap<String, FileCollectionFingerprint>;

/// Fingerprint of a non-file input property value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueSnapshot(pub HashCode);

/// Identifies the implementation (type and class path) of a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationSnapshot {
    /// Fully qualified type name.
    pub type_name: String,
    /// Hash of the loader that supplied the type; `None` when unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_loader_hash: Option<HashCode>,
}

impl ImplementationSnapshot {
    /// Creates an implementation snapshot with a known loader hash.
    #[must_use]
    pub fn new(type_name: impl Into<String>, class_loader_hash: HashCode) -> Self {
        Self {
            type_name: type_name.into(),
            class_loader_hash: Some(class_loader_hash),
        }
    }

    /// Creates an implementation snapshot whose loader could not be identified.
    #[must_use]
    pub fn unknown_loader(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            class_loader_hash: None,
        }
    }

    /// Returns true if the loader is unknown.
    #[must_use]
    pub fn is_unknown_loader(&self) -> bool {
        self.class_loader_hash.is_none()
    }
}
