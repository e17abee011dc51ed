// crates/pathway-gate-core/src/runtime/graph.rs
// ============================================================================
// Module: Pathway Gate Graph Model
// Description: In-memory activities and prerequisite groups for one pathway.
// Purpose: Normalize prerequisite groups and answer adjacency queries.
// Dependencies: crate::core, crate::runtime::{cycle, engine}, serde
// ============================================================================

//! ## Overview
//! A [`PathwayGraph`] holds one pathway's activities and the prerequisite
//! groups attached to each gated activity, plus a derived edge index
//! (`gated -> prerequisites`) used by cycle detection. Graphs are only built
//! through [`PathwayGraph::from_definition`], which rejects cyclic snapshots,
//! and only mutated through `replace_groups`, which the engine facade calls
//! after the cycle detector approves an edit. The graph is therefore acyclic
//! for its whole lifetime.
//!
//! Normalization rules applied to every submitted group list:
//! - groups left with zero items are dropped;
//! - duplicate items inside a group collapse to their first occurrence;
//! - self references and out-of-range `n_required` are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::Activity;
use crate::core::ActivityId;
use crate::core::ActivityPrerequisites;
use crate::core::DEFAULT_HASH_ALGORITHM;
use crate::core::HashDigest;
use crate::core::HashError;
use crate::core::PathwayDefinition;
use crate::core::PathwayId;
use crate::core::PrereqRule;
use crate::core::PrerequisiteGroup;
use crate::core::ValidationError;
use crate::core::hashing::hash_canonical_json;
use crate::runtime::cycle::EdgeView;
use crate::runtime::cycle::find_cycle;
use crate::runtime::engine::EngineError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum activities per pathway.
pub const DEFAULT_MAX_ACTIVITIES: usize = 1024;
/// Default maximum prerequisite groups per gated activity.
pub const DEFAULT_MAX_GROUPS_PER_ACTIVITY: usize = 32;
/// Default maximum distinct items per prerequisite group.
pub const DEFAULT_MAX_ITEMS_PER_GROUP: usize = 256;

/// Structural limits enforced while loading snapshots and normalizing edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    /// Maximum activities in one pathway.
    pub max_activities: usize,
    /// Maximum groups attached to one activity.
    pub max_groups_per_activity: usize,
    /// Maximum distinct items in one group.
    pub max_items_per_group: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_activities: DEFAULT_MAX_ACTIVITIES,
            max_groups_per_activity: DEFAULT_MAX_GROUPS_PER_ACTIVITY,
            max_items_per_group: DEFAULT_MAX_ITEMS_PER_GROUP,
        }
    }
}

// ============================================================================
// SECTION: Reference Policy
// ============================================================================

/// Treatment of prerequisite items missing from the activity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferencePolicy {
    /// Reject unknown items (operator edits).
    Strict,
    /// Keep unknown items as unsatisfiable references (deleted activities in snapshots).
    TolerateDangling,
}

// ============================================================================
// SECTION: Pathway Graph
// ============================================================================

/// Graph Model for one pathway.
///
/// # Invariants
/// - Acyclic: no activity depends, directly or transitively, on itself.
/// - Every stored group has at least one distinct item and a valid rule.
/// - `edges` is the per-activity union of group items and has no empty entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayGraph {
    /// Pathway identifier.
    pathway_id: PathwayId,
    /// Activities keyed by identifier.
    activities: BTreeMap<ActivityId, Activity>,
    /// Prerequisite groups keyed by gated activity, in submitted order.
    groups: BTreeMap<ActivityId, Vec<PrerequisiteGroup>>,
    /// Derived edge index: gated activity to the union of its prerequisites.
    #[serde(skip)]
    edges: BTreeMap<ActivityId, BTreeSet<ActivityId>>,
}

impl PathwayGraph {
    /// Builds a Graph Model from a host-supplied pathway snapshot.
    ///
    /// References to activities missing from the snapshot are kept; they
    /// evaluate as never complete.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the snapshot is malformed, exceeds
    /// `limits`, or already contains a circular dependency.
    pub fn from_definition(
        definition: PathwayDefinition,
        limits: &GraphLimits,
    ) -> Result<Self, ValidationError> {
        let PathwayDefinition {
            pathway_id,
            activities: activity_list,
            prerequisites,
        } = definition;

        ensure_within("max_activities_per_pathway", limits.max_activities, activity_list.len())?;

        let mut activities = BTreeMap::new();
        for activity in activity_list {
            if activity.pathway_id != pathway_id {
                return Err(ValidationError::PathwayMismatch {
                    activity_id: activity.activity_id,
                    expected: pathway_id,
                    actual: activity.pathway_id,
                });
            }
            if !is_valid_weight(activity.weight) {
                return Err(ValidationError::InvalidActivityWeight {
                    activity_id: activity.activity_id,
                    weight: activity.weight,
                });
            }
            if activities.contains_key(&activity.activity_id) {
                return Err(ValidationError::DuplicateActivity(activity.activity_id));
            }
            activities.insert(activity.activity_id.clone(), activity);
        }

        let mut graph = Self {
            pathway_id,
            activities,
            groups: BTreeMap::new(),
            edges: BTreeMap::new(),
        };

        let mut seen = BTreeSet::new();
        for ActivityPrerequisites {
            activity_id,
            groups,
        } in prerequisites
        {
            if !graph.activities.contains_key(&activity_id) {
                return Err(ValidationError::GatedActivityOutsidePathway {
                    activity_id,
                });
            }
            if !seen.insert(activity_id.clone()) {
                return Err(ValidationError::DuplicateGatedActivity(activity_id));
            }
            let groups =
                graph.normalize(&activity_id, groups, limits, ReferencePolicy::TolerateDangling)?;
            graph.install(activity_id, groups);
        }

        let view = EdgeView::new(&graph.edges, None);
        if let Some(cycle) = find_cycle(&view, graph.edges.keys()) {
            return Err(ValidationError::CyclicSnapshot {
                cycle,
            });
        }

        Ok(graph)
    }

    /// Returns the pathway identifier.
    #[must_use]
    pub const fn pathway_id(&self) -> &PathwayId {
        &self.pathway_id
    }

    /// Returns true when the activity belongs to this pathway.
    #[must_use]
    pub fn contains(&self, activity_id: &ActivityId) -> bool {
        self.activities.contains_key(activity_id)
    }

    /// Returns an activity by identifier.
    #[must_use]
    pub fn activity(&self, activity_id: &ActivityId) -> Option<&Activity> {
        self.activities.get(activity_id)
    }

    /// Iterates activities in identifier order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> {
        self.activities.values()
    }

    /// Returns the number of activities.
    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    /// Returns the union of prerequisite activity ids across every group of
    /// `activity_id`. Group rules are irrelevant here; any item is an edge.
    #[must_use]
    pub fn get_prerequisite_activity_ids(&self, activity_id: &ActivityId) -> BTreeSet<ActivityId> {
        self.edges.get(activity_id).cloned().unwrap_or_default()
    }

    /// Returns the activities that list `activity_id` as a prerequisite.
    #[must_use]
    pub fn get_dependent_activity_ids(&self, activity_id: &ActivityId) -> BTreeSet<ActivityId> {
        self.edges
            .iter()
            .filter(|(_, prerequisites)| prerequisites.contains(activity_id))
            .map(|(gated, _)| gated.clone())
            .collect()
    }

    /// Returns the ordered prerequisite groups of an activity.
    #[must_use]
    pub fn get_groups(&self, activity_id: &ActivityId) -> &[PrerequisiteGroup] {
        self.groups.get(activity_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Validates and normalizes a proposed group list for `activity_id`.
    ///
    /// Every item must reference an activity in this pathway.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownActivity`] when the gated activity is not
    /// in the pathway, and [`EngineError::Validation`] for malformed groups.
    pub fn normalize_groups(
        &self,
        activity_id: &ActivityId,
        groups: Vec<PrerequisiteGroup>,
        limits: &GraphLimits,
    ) -> Result<Vec<PrerequisiteGroup>, EngineError> {
        self.require_activity(activity_id)?;
        Ok(self.normalize(activity_id, groups, limits, ReferencePolicy::Strict)?)
    }

    /// Replaces the prerequisite groups of an activity.
    ///
    /// Only structural invariants are checked here; the caller must have run
    /// cycle detection against the same groups first.
    pub(crate) fn replace_groups(
        &mut self,
        activity_id: &ActivityId,
        groups: Vec<PrerequisiteGroup>,
        limits: &GraphLimits,
    ) -> Result<(), EngineError> {
        let groups = self.normalize_groups(activity_id, groups, limits)?;
        self.install(activity_id.clone(), groups);
        Ok(())
    }

    /// Returns the derived edge index.
    pub(crate) const fn edges(&self) -> &BTreeMap<ActivityId, BTreeSet<ActivityId>> {
        &self.edges
    }

    /// Computes a canonical fingerprint of the activities and groups.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when canonical serialization fails.
    pub fn fingerprint(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(DEFAULT_HASH_ALGORITHM, self)
    }

    /// Exports the graph back into the snapshot contract for persistence.
    #[must_use]
    pub fn to_definition(&self) -> PathwayDefinition {
        PathwayDefinition {
            pathway_id: self.pathway_id.clone(),
            activities: self.activities.values().cloned().collect(),
            prerequisites: self
                .groups
                .iter()
                .map(|(activity_id, groups)| {
                    ActivityPrerequisites::new(activity_id.clone(), groups.clone())
                })
                .collect(),
        }
    }

    /// Fails with [`EngineError::UnknownActivity`] when the activity is absent.
    pub(crate) fn require_activity(&self, activity_id: &ActivityId) -> Result<(), EngineError> {
        if self.contains(activity_id) {
            Ok(())
        } else {
            Err(EngineError::UnknownActivity {
                pathway_id: self.pathway_id.clone(),
                activity_id: activity_id.clone(),
            })
        }
    }

    /// Applies the normalization rules to a submitted group list.
    fn normalize(
        &self,
        activity_id: &ActivityId,
        groups: Vec<PrerequisiteGroup>,
        limits: &GraphLimits,
        policy: ReferencePolicy,
    ) -> Result<Vec<PrerequisiteGroup>, ValidationError> {
        let mut normalized = Vec::with_capacity(groups.len());
        for (group_index, group) in groups.into_iter().enumerate() {
            let mut seen = BTreeSet::new();
            let mut items = Vec::with_capacity(group.items.len());
            for item in group.items {
                if &item == activity_id {
                    return Err(ValidationError::SelfReference {
                        activity_id: activity_id.clone(),
                    });
                }
                if policy == ReferencePolicy::Strict && !self.contains(&item) {
                    return Err(ValidationError::ActivityOutsidePathway {
                        activity_id: activity_id.clone(),
                        prerequisite_activity_id: item,
                    });
                }
                if seen.insert(item.clone()) {
                    items.push(item);
                }
            }
            if items.is_empty() {
                continue;
            }
            ensure_within("max_items_per_group", limits.max_items_per_group, items.len())?;
            if let PrereqRule::NOfM {
                n_required,
            } = group.rule
                && (n_required == 0 || n_required > items.len())
            {
                return Err(ValidationError::NRequiredOutOfRange {
                    activity_id: activity_id.clone(),
                    group_index,
                    n_required,
                    item_count: items.len(),
                });
            }
            normalized.push(PrerequisiteGroup {
                rule: group.rule,
                items,
            });
        }
        ensure_within("max_groups_per_activity", limits.max_groups_per_activity, normalized.len())?;
        Ok(normalized)
    }

    /// Stores normalized groups and refreshes the derived edge entry.
    fn install(&mut self, activity_id: ActivityId, groups: Vec<PrerequisiteGroup>) {
        if groups.is_empty() {
            self.groups.remove(&activity_id);
            self.edges.remove(&activity_id);
            return;
        }
        let prerequisites = union_of_items(&groups);
        self.edges.insert(activity_id.clone(), prerequisites);
        self.groups.insert(activity_id, groups);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Collects the distinct items across groups.
pub(crate) fn union_of_items(groups: &[PrerequisiteGroup]) -> BTreeSet<ActivityId> {
    groups.iter().flat_map(|group| group.items.iter().cloned()).collect()
}

/// Returns true for finite, non-negative weights.
pub(crate) fn is_valid_weight(weight: f64) -> bool {
    weight.is_finite() && weight >= 0.0
}

/// Fails with [`ValidationError::LimitExceeded`] when `actual > max`.
pub(crate) fn ensure_within(
    limit: &'static str,
    max: usize,
    actual: usize,
) -> Result<(), ValidationError> {
    if actual > max {
        Err(ValidationError::LimitExceeded {
            limit,
            max,
            actual,
        })
    } else {
        Ok(())
    }
}
