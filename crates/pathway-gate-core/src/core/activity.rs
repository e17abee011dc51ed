// crates/pathway-gate-core/src/core/activity.rs
// ============================================================================
// Module: Pathway Gate Activities
// Description: Activity records and pathway snapshot definitions.
// Purpose: Describe the read-only activity data supplied by the host application.
// Dependencies: crate::core::{identifiers, prerequisite}, serde
// ============================================================================

//! ## Overview
//! Activities are owned by the external pathway editor. The engine only reads
//! their identity and weight; `ordering_hint` is carried for display and never
//! influences correctness. A [`PathwayDefinition`] is the complete snapshot a
//! host hands over when (re)building a pathway's Graph Model.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ActivityId;
use crate::core::identifiers::PathwayId;
use crate::core::prerequisite::ActivityPrerequisites;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Weight applied to activities that do not specify one.
pub const DEFAULT_ACTIVITY_WEIGHT: f64 = 1.0;

/// Serde default for [`Activity::weight`].
const fn default_weight() -> f64 {
    DEFAULT_ACTIVITY_WEIGHT
}

// ============================================================================
// SECTION: Activity
// ============================================================================

/// One unit of work inside a pathway.
///
/// # Invariants
/// - `weight` must be finite and non-negative once accepted by a Graph Model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Activity identifier, unique within the pathway.
    pub activity_id: ActivityId,
    /// Owning pathway identifier.
    pub pathway_id: PathwayId,
    /// Rollup weight.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Display ordering hint.
    #[serde(default)]
    pub ordering_hint: i64,
}

impl Activity {
    /// Creates an activity with the default weight and no ordering hint.
    #[must_use]
    pub fn new(pathway_id: impl Into<PathwayId>, activity_id: impl Into<ActivityId>) -> Self {
        Self {
            activity_id: activity_id.into(),
            pathway_id: pathway_id.into(),
            weight: DEFAULT_ACTIVITY_WEIGHT,
            ordering_hint: 0,
        }
    }

    /// Returns the activity with an explicit rollup weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Returns the activity with an explicit ordering hint.
    #[must_use]
    pub fn with_ordering_hint(mut self, ordering_hint: i64) -> Self {
        self.ordering_hint = ordering_hint;
        self
    }
}

// ============================================================================
// SECTION: Pathway Definition
// ============================================================================

/// Full pathway snapshot supplied by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathwayDefinition {
    /// Pathway identifier.
    pub pathway_id: PathwayId,
    /// Every activity in the pathway.
    pub activities: Vec<Activity>,
    /// Prerequisite groups keyed by gated activity.
    #[serde(default)]
    pub prerequisites: Vec<ActivityPrerequisites>,
}

impl PathwayDefinition {
    /// Creates a definition with no prerequisites.
    #[must_use]
    pub fn new(pathway_id: impl Into<PathwayId>, activities: Vec<Activity>) -> Self {
        Self {
            pathway_id: pathway_id.into(),
            activities,
            prerequisites: Vec::new(),
        }
    }

    /// Returns the definition with the provided prerequisite entries.
    #[must_use]
    pub fn with_prerequisites(mut self, prerequisites: Vec<ActivityPrerequisites>) -> Self {
        self.prerequisites = prerequisites;
        self
    }
}
