//! Execution history snapshots.
//!
//! This module provides:
//! - Fingerprint value types for files, file collections and implementations
//! - The snapshot taken before an execution
//! - The record kept from the previous execution
//!
//! Fingerprints are computed by the snapshotting subsystem and records are
//! persisted by the history store; this crate only reads them.

mod fingerprint;
mod state;

pub use fingerprint::{
    FileCollectionFingerprint, FileFingerprint, FileType, HashCode, ImplementationSnapshot,
    InputFileProperties, OutputFileProperties, ValueSnapshot,
};
pub use state::{AfterPreviousExecutionState, BeforeExecutionState, OriginMetadata};
