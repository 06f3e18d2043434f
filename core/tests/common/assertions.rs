// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Custom assertion helpers for integration tests.

use tasksync_core::{ChangeSet, PollOutcome};

use crate::common::fixtures::Note;

/// Unwraps a changed poll outcome.
///
/// # Panics
///
/// Panics if the outcome is not [`PollOutcome::Changed`].
pub fn expect_changed(outcome: PollOutcome<Note>) -> ChangeSet<Note> {
    match outcome {
        PollOutcome::Changed { changes, .. } => changes,
        other => panic!("expected a changed poll, got {other:?}"),
    }
}

/// Asserts the size of each list of a change set.
///
/// # Panics
///
/// Panics if any count differs.
pub fn assert_counts(changes: &ChangeSet<Note>, created: usize, modified: usize, removed: usize) {
    assert_eq!(changes.created.len(), created, "created mismatch: {changes:?}");
    assert_eq!(changes.modified.len(), modified, "modified mismatch: {changes:?}");
    assert_eq!(changes.removed.len(), removed, "removed mismatch: {changes:?}");
}
