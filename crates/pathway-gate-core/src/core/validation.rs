// crates/pathway-gate-core/src/core/validation.rs
// ============================================================================
// Module: Pathway Gate Validation Errors
// Description: Structural validation failures for activities, groups, and rollups.
// Purpose: Describe malformed input rejected before any graph mutation.
// Dependencies: crate::core::identifiers, thiserror
// ============================================================================

//! ## Overview
//! Validation errors are raised synchronously before anything is committed.
//! They carry structured data (identifiers, counts, cycle paths) so the admin
//! layer can build its own operator-facing wording.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::ActivityId;
use crate::core::identifiers::PathwayId;

// ============================================================================
// SECTION: Validation Errors
// ============================================================================

/// Malformed input rejected by the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A group lists the gated activity as its own prerequisite.
    #[error("activity {activity_id} cannot be its own prerequisite")]
    SelfReference {
        /// Gated activity identifier.
        activity_id: ActivityId,
    },
    /// An `n_of_m` group requires more items than it has, or zero.
    #[error(
        "group {group_index} on activity {activity_id}: n_required {n_required} must be between 1 \
         and {item_count}"
    )]
    NRequiredOutOfRange {
        /// Gated activity identifier.
        activity_id: ActivityId,
        /// Position of the group in the submitted list.
        group_index: usize,
        /// Requested minimum.
        n_required: usize,
        /// Distinct items in the group.
        item_count: usize,
    },
    /// A prerequisite references an activity outside the pathway.
    #[error("activity {activity_id} references {prerequisite_activity_id} outside the pathway")]
    ActivityOutsidePathway {
        /// Gated activity identifier.
        activity_id: ActivityId,
        /// Unknown prerequisite identifier.
        prerequisite_activity_id: ActivityId,
    },
    /// A snapshot lists prerequisites for an activity that is not in the pathway.
    #[error("prerequisites supplied for activity {activity_id} outside the pathway")]
    GatedActivityOutsidePathway {
        /// Gated activity identifier.
        activity_id: ActivityId,
    },
    /// An activity belongs to a different pathway than the snapshot.
    #[error("activity {activity_id} belongs to pathway {actual}, expected {expected}")]
    PathwayMismatch {
        /// Activity identifier.
        activity_id: ActivityId,
        /// Pathway the snapshot describes.
        expected: PathwayId,
        /// Pathway recorded on the activity.
        actual: PathwayId,
    },
    /// The same activity appears twice in a snapshot.
    #[error("duplicate activity identifier: {0}")]
    DuplicateActivity(ActivityId),
    /// The same gated activity appears twice in one snapshot or batch edit.
    #[error("prerequisites for activity {0} supplied more than once")]
    DuplicateGatedActivity(ActivityId),
    /// An activity weight is negative or not finite.
    #[error("activity {activity_id} has invalid weight {weight}")]
    InvalidActivityWeight {
        /// Activity identifier.
        activity_id: ActivityId,
        /// Rejected weight.
        weight: f64,
    },
    /// A rollup entry weight is negative or not finite.
    #[error("rollup weight {0} must be finite and non-negative")]
    InvalidWeight(f64),
    /// A rollup entry percentage is not finite.
    #[error("completion percent {0} must be finite")]
    InvalidCompletionPercent(f64),
    /// Summing finite entries overflowed.
    #[error("rollup aggregation overflowed")]
    RollupOverflow,
    /// A snapshot already contains a circular dependency.
    #[error("prerequisite snapshot contains a cycle: {}", format_cycle(.cycle))]
    CyclicSnapshot {
        /// Cycle path, closing back to its first activity.
        cycle: Vec<ActivityId>,
    },
    /// A configured structural limit was exceeded.
    #[error("{limit} exceeded: {actual} (max {max})")]
    LimitExceeded {
        /// Limit name.
        limit: &'static str,
        /// Configured maximum.
        max: usize,
        /// Observed value.
        actual: usize,
    },
}

/// Renders a cycle path as `a -> b -> a`.
fn format_cycle(cycle: &[ActivityId]) -> String {
    cycle.iter().map(ActivityId::as_str).collect::<Vec<_>>().join(" -> ")
}
