// crates/pathway-gate-core/src/runtime/satisfaction.rs
// ============================================================================
// Module: Pathway Gate Satisfaction Evaluator
// Description: Unlock decisions from prerequisite groups and completion snapshots.
// Purpose: Decide whether a participant may start an activity.
// Dependencies: crate::core, crate::runtime::{engine, graph}, serde
// ============================================================================

//! ## Overview
//! An activity unlocks when every prerequisite group attached to it is
//! satisfied (AND across groups); an activity without groups is always
//! unlocked. Within a group:
//! - `all_of` needs every item complete,
//! - `any_of` needs at least one,
//! - `n_of_m` needs at least `n_required`.
//!
//! Only the binary `complete` status counts; partial percentages never do.
//! Items that reference activities no longer in the pathway never count as
//! complete, even if a stale snapshot says otherwise.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ActivityId;
use crate::core::CompletionSnapshot;
use crate::core::PrereqRule;
use crate::core::PrerequisiteGroup;
use crate::runtime::engine::EngineError;
use crate::runtime::graph::PathwayGraph;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Evaluation detail for one prerequisite group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOutcome {
    /// Position of the group on the gated activity.
    pub group_index: usize,
    /// Group rule.
    pub rule: PrereqRule,
    /// Items counted as complete.
    pub completed: usize,
    /// Items required for satisfaction.
    pub required: usize,
    /// Whether the group is satisfied.
    pub satisfied: bool,
    /// Items not yet counted as complete.
    pub pending: Vec<ActivityId>,
}

/// Full unlock explanation for one activity and one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockReport {
    /// Gated activity identifier.
    pub activity_id: ActivityId,
    /// Whether every group is satisfied.
    pub unlocked: bool,
    /// Per-group outcomes in group order.
    pub groups: Vec<GroupOutcome>,
}

// ============================================================================
// SECTION: Satisfaction Evaluator
// ============================================================================

/// Evaluates unlock state against a pathway's Graph Model.
#[derive(Debug, Clone, Copy)]
pub struct SatisfactionEvaluator<'a> {
    /// Graph snapshot providing groups and activity membership.
    graph: &'a PathwayGraph,
}

impl<'a> SatisfactionEvaluator<'a> {
    /// Creates an evaluator over a graph snapshot.
    #[must_use]
    pub const fn new(graph: &'a PathwayGraph) -> Self {
        Self {
            graph,
        }
    }

    /// Returns whether `activity_id` is unlocked for the given snapshot.
    ///
    /// Stops at the first unsatisfied group.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownActivity`] when the activity is not in the pathway.
    pub fn is_unlocked(
        &self,
        activity_id: &ActivityId,
        snapshot: &CompletionSnapshot,
    ) -> Result<bool, EngineError> {
        self.graph.require_activity(activity_id)?;
        Ok(self
            .graph
            .get_groups(activity_id)
            .iter()
            .all(|group| group_satisfied(group, |item| self.is_done(item, snapshot))))
    }

    /// Explains the unlock decision group by group.
    ///
    /// Every group is evaluated so the report lists all outstanding items.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownActivity`] when the activity is not in the pathway.
    pub fn explain(
        &self,
        activity_id: &ActivityId,
        snapshot: &CompletionSnapshot,
    ) -> Result<UnlockReport, EngineError> {
        self.graph.require_activity(activity_id)?;
        let groups: Vec<GroupOutcome> = self
            .graph
            .get_groups(activity_id)
            .iter()
            .enumerate()
            .map(|(group_index, group)| self.group_outcome(group_index, group, snapshot))
            .collect();
        Ok(UnlockReport {
            activity_id: activity_id.clone(),
            unlocked: groups.iter().all(|outcome| outcome.satisfied),
            groups,
        })
    }

    /// Lists every unlocked activity in the pathway, in identifier order.
    #[must_use]
    pub fn unlocked_activities(&self, snapshot: &CompletionSnapshot) -> Vec<ActivityId> {
        self.graph
            .activities()
            .filter(|activity| {
                self.graph
                    .get_groups(&activity.activity_id)
                    .iter()
                    .all(|group| group_satisfied(group, |item| self.is_done(item, snapshot)))
            })
            .map(|activity| activity.activity_id.clone())
            .collect()
    }

    /// An item counts only if it is still in the pathway and marked complete.
    fn is_done(&self, item: &ActivityId, snapshot: &CompletionSnapshot) -> bool {
        self.graph.contains(item) && snapshot.is_complete(item)
    }

    /// Builds the detailed outcome for one group.
    fn group_outcome(
        &self,
        group_index: usize,
        group: &PrerequisiteGroup,
        snapshot: &CompletionSnapshot,
    ) -> GroupOutcome {
        let (done, pending): (Vec<&ActivityId>, Vec<&ActivityId>) =
            group.items.iter().partition(|item| self.is_done(item, snapshot));
        let required = group.required_count();
        GroupOutcome {
            group_index,
            rule: group.rule,
            completed: done.len(),
            required,
            satisfied: done.len() >= required,
            pending: pending.into_iter().cloned().collect(),
        }
    }
}

// ============================================================================
// SECTION: Group Evaluation
// ============================================================================

/// Decides one group with early exit once the outcome is determined.
fn group_satisfied<F>(group: &PrerequisiteGroup, done: F) -> bool
where
    F: Fn(&ActivityId) -> bool,
{
    match group.rule {
        PrereqRule::AllOf => group.items.iter().all(done),
        PrereqRule::AnyOf => group.items.iter().any(done),
        PrereqRule::NOfM {
            n_required,
        } => {
            let mut satisfied = 0usize;
            let mut remaining = group.items.len();
            for item in &group.items {
                if done(item) {
                    satisfied += 1;
                    if satisfied >= n_required {
                        return true;
                    }
                }
                remaining -= 1;
                if satisfied + remaining < n_required {
                    return false;
                }
            }
            satisfied >= n_required
        }
    }
}
