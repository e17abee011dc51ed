// crates/pathway-gate-core/src/core/completion.rs
// ============================================================================
// Module: Pathway Gate Completion State
// Description: Per-enrollment, per-activity completion snapshots.
// Purpose: Carry read-only participant progress into evaluation and rollups.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! Completion state is owned by the host; the engine only reads it. Unlock
//! evaluation looks at the binary `complete` status, while rollups use
//! `completion_percent`. Activities absent from a snapshot are treated as
//! not started.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ActivityId;

// ============================================================================
// SECTION: Completion Status
// ============================================================================

/// Participant progress status for one activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    /// No progress recorded.
    #[default]
    NotStarted,
    /// Started but not finished.
    InProgress,
    /// Finished.
    Complete,
}

// ============================================================================
// SECTION: Activity Completion State
// ============================================================================

/// Completion state of one activity for one enrollment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityCompletionState {
    /// Binary completion status.
    pub completion_status: CompletionStatus,
    /// Partial completion percentage in `[0, 100]`.
    #[serde(default)]
    pub completion_percent: f64,
}

impl ActivityCompletionState {
    /// Creates a completion state.
    #[must_use]
    pub const fn new(completion_status: CompletionStatus, completion_percent: f64) -> Self {
        Self {
            completion_status,
            completion_percent,
        }
    }

    /// Returns a fully complete state (100%).
    #[must_use]
    pub const fn complete() -> Self {
        Self::new(CompletionStatus::Complete, 100.0)
    }

    /// Returns an in-progress state at the given percentage.
    #[must_use]
    pub const fn in_progress(completion_percent: f64) -> Self {
        Self::new(CompletionStatus::InProgress, completion_percent)
    }

    /// Returns a not-started state (0%).
    #[must_use]
    pub const fn not_started() -> Self {
        Self::new(CompletionStatus::NotStarted, 0.0)
    }

    /// Returns true when the status is `complete`.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.completion_status, CompletionStatus::Complete)
    }
}

// ============================================================================
// SECTION: Completion Snapshot
// ============================================================================

/// Completion states for one enrollment, keyed by activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionSnapshot {
    /// States keyed by activity identifier.
    states: BTreeMap<ActivityId, ActivityCompletionState>,
}

impl CompletionSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            states: BTreeMap::new(),
        }
    }

    /// Returns the snapshot with an added or replaced state.
    #[must_use]
    pub fn with(
        mut self,
        activity_id: impl Into<ActivityId>,
        state: ActivityCompletionState,
    ) -> Self {
        self.insert(activity_id, state);
        self
    }

    /// Inserts or replaces the state for an activity.
    pub fn insert(&mut self, activity_id: impl Into<ActivityId>, state: ActivityCompletionState) {
        self.states.insert(activity_id.into(), state);
    }

    /// Returns the state for an activity, if recorded.
    #[must_use]
    pub fn get(&self, activity_id: &ActivityId) -> Option<&ActivityCompletionState> {
        self.states.get(activity_id)
    }

    /// Returns true when the activity is recorded as complete.
    #[must_use]
    pub fn is_complete(&self, activity_id: &ActivityId) -> bool {
        self.states.get(activity_id).is_some_and(ActivityCompletionState::is_complete)
    }

    /// Iterates recorded states in activity order.
    pub fn iter(&self) -> btree_map::Iter<'_, ActivityId, ActivityCompletionState> {
        self.states.iter()
    }

    /// Returns the number of recorded states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true when no states are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl<A: Into<ActivityId>> FromIterator<(A, ActivityCompletionState)> for CompletionSnapshot {
    fn from_iter<T: IntoIterator<Item = (A, ActivityCompletionState)>>(iter: T) -> Self {
        Self {
            states: iter.into_iter().map(|(id, state)| (id.into(), state)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CompletionSnapshot {
    type Item = (&'a ActivityId, &'a ActivityCompletionState);
    type IntoIter = btree_map::Iter<'a, ActivityId, ActivityCompletionState>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}
