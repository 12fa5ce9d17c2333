//! Test assertions for resolved changes.

use crate::changes::{IncrementalChanges, RebuildChanges, ResolvedChanges};

/// Asserts that incremental tracking was not engaged.
pub fn assert_untracked(changes: &ResolvedChanges) {
    assert!(
        changes.is_untracked(),
        "Expected untracked, got: {changes:?}"
    );
}

/// Asserts a rebuild with the expected reason and returns it.
pub fn assert_rebuild<'a>(changes: &'a ResolvedChanges, expected_reason: &str) -> &'a RebuildChanges {
    match changes {
        ResolvedChanges::Rebuild(rebuild) => {
            assert_eq!(
                rebuild.reason, expected_reason,
                "Expected rebuild reason {expected_reason:?}, got {:?}",
                rebuild.reason
            );
            rebuild
        }
        other => panic!("Expected rebuild ({expected_reason:?}), got: {other:?}"),
    }
}

/// Asserts incremental changes and returns them.
pub fn assert_incremental(changes: &ResolvedChanges) -> &IncrementalChanges {
    match changes {
        ResolvedChanges::Incremental(incremental) => incremental,
        other => panic!("Expected incremental changes, got: {other:?}"),
    }
}
