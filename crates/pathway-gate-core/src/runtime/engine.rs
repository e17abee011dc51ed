// crates/pathway-gate-core/src/runtime/engine.rs
// ============================================================================
// Module: Pathway Gate Engine Facade
// Description: Single entry point for prerequisite edits, unlocks, and rollups.
// Purpose: Orchestrate the graph, cycle detector, evaluator, and calculator.
// Dependencies: crate::{core, interfaces, runtime}, thiserror
// ============================================================================

//! ## Overview
//! [`PrerequisiteEngine`] is the only surface external collaborators call.
//! Every operation fetches the pathway's current Graph Model from the
//! [`PathwayGraphStore`], works on that snapshot, and returns a fully
//! computed result or an error; nothing blocks and nothing is cached.
//!
//! A prerequisite edit moves through `Proposed -> Validating` and ends as
//! either `Accepted` (the graph is replaced and saved) or `Rejected` (the
//! store is never written and the cycle is returned). Malformed edits fail
//! with [`EngineError::Validation`] before cycle detection runs.
//!
//! Serializing concurrent editors of one pathway is the host's job.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::ActivityId;
use crate::core::ActivityPrerequisites;
use crate::core::CompletionSnapshot;
use crate::core::HashDigest;
use crate::core::HashError;
use crate::core::PathwayDefinition;
use crate::core::PathwayId;
use crate::core::PrerequisiteGroup;
use crate::core::ValidationError;
use crate::interfaces::PathwayGraphStore;
use crate::interfaces::StoreError;
use crate::runtime::cycle::CycleCheck;
use crate::runtime::cycle::CycleDetector;
use crate::runtime::graph::GraphLimits;
use crate::runtime::graph::PathwayGraph;
use crate::runtime::graph::ensure_within;
use crate::runtime::graph::union_of_items;
use crate::runtime::rollup::CohortWeighting;
use crate::runtime::rollup::CompletionRollup;
use crate::runtime::rollup::RollupEntry;
use crate::runtime::rollup::compose_rollups;
use crate::runtime::rollup::compute_rollup;
use crate::runtime::rollup::pathway_entries;
use crate::runtime::satisfaction::SatisfactionEvaluator;
use crate::runtime::satisfaction::UnlockReport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Engine facade errors.
///
/// A rejected cyclic edit is not an error; see [`CycleCheck`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input failed structural validation.
    #[error("invalid prerequisite data: {0}")]
    Validation(#[from] ValidationError),
    /// Activity is not part of the pathway.
    #[error("unknown activity {activity_id} in pathway {pathway_id}")]
    UnknownActivity {
        /// Pathway that was searched.
        pathway_id: PathwayId,
        /// Missing activity.
        activity_id: ActivityId,
    },
    /// Pathway has never been loaded into the store.
    #[error("unknown pathway: {0}")]
    UnknownPathway(PathwayId),
    /// Graph store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Fingerprint failure.
    #[error(transparent)]
    Hash(#[from] HashError),
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Structural limits for snapshots and edits.
    pub limits: GraphLimits,
    /// Weighting used by [`PrerequisiteEngine::compute_cohort_rollup`].
    pub cohort_weighting: CohortWeighting,
}

// ============================================================================
// SECTION: Engine Facade
// ============================================================================

/// Prerequisite and rollup engine bound to a graph store.
#[derive(Debug, Clone)]
pub struct PrerequisiteEngine<S> {
    /// Graph snapshot store.
    store: S,
    /// Engine configuration.
    config: EngineConfig,
}

impl<S: PathwayGraphStore> PrerequisiteEngine<S> {
    /// Creates an engine over a graph store.
    #[must_use]
    pub const fn new(store: S, config: EngineConfig) -> Self {
        Self {
            store,
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the underlying graph store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validates a pathway snapshot and saves it as the current Graph Model,
    /// replacing any previous snapshot for the same pathway.
    ///
    /// Returns the fingerprint of the stored graph.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the snapshot is invalid or cannot be stored.
    pub fn load_pathway(&self, definition: PathwayDefinition) -> Result<HashDigest, EngineError> {
        let graph = PathwayGraph::from_definition(definition, &self.config.limits)?;
        let fingerprint = graph.fingerprint()?;
        self.store.save(&graph)?;
        Ok(fingerprint)
    }

    /// Returns the current Graph Model of a pathway.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPathway`] when no snapshot is stored.
    pub fn pathway_graph(&self, pathway_id: &PathwayId) -> Result<PathwayGraph, EngineError> {
        self.store.load(pathway_id)?.ok_or_else(|| EngineError::UnknownPathway(pathway_id.clone()))
    }

    /// Validates a group replacement without committing it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown pathways or activities and
    /// malformed groups.
    pub fn validate_prerequisite_edit(
        &self,
        pathway_id: &PathwayId,
        activity_id: &ActivityId,
        proposed_groups: Vec<PrerequisiteGroup>,
    ) -> Result<CycleCheck, EngineError> {
        self.validate_prerequisite_edits(
            pathway_id,
            vec![ActivityPrerequisites::new(activity_id.clone(), proposed_groups)],
        )
    }

    /// Validates several group replacements applied together without committing them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown pathways or activities, malformed
    /// groups, and repeated activities in one batch.
    pub fn validate_prerequisite_edits(
        &self,
        pathway_id: &PathwayId,
        edits: Vec<ActivityPrerequisites>,
    ) -> Result<CycleCheck, EngineError> {
        let graph = self.pathway_graph(pathway_id)?;
        let (check, _) = self.review(&graph, edits)?;
        Ok(check)
    }

    /// Replaces an activity's prerequisite groups when the result stays acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown pathways or activities, malformed
    /// groups, and store failures. A cycle is reported through the returned
    /// [`CycleCheck`], not as an error.
    pub fn propose_prerequisite_change(
        &self,
        pathway_id: &PathwayId,
        activity_id: &ActivityId,
        new_groups: Vec<PrerequisiteGroup>,
    ) -> Result<CycleCheck, EngineError> {
        self.propose_prerequisite_changes(
            pathway_id,
            vec![ActivityPrerequisites::new(activity_id.clone(), new_groups)],
        )
    }

    /// Replaces several activities' groups atomically when the combined result
    /// stays acyclic. Either every edit is committed or none is.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] under the same conditions as
    /// [`Self::validate_prerequisite_edits`], plus store failures.
    pub fn propose_prerequisite_changes(
        &self,
        pathway_id: &PathwayId,
        edits: Vec<ActivityPrerequisites>,
    ) -> Result<CycleCheck, EngineError> {
        let mut graph = self.pathway_graph(pathway_id)?;
        let (check, normalized) = self.review(&graph, edits)?;
        if !check.is_valid() {
            return Ok(check);
        }
        for (activity_id, groups) in normalized {
            graph.replace_groups(&activity_id, groups, &self.config.limits)?;
        }
        self.store.save(&graph)?;
        Ok(check)
    }

    /// Returns whether an activity is unlocked for a participant snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown pathways or activities.
    pub fn is_activity_unlocked(
        &self,
        pathway_id: &PathwayId,
        activity_id: &ActivityId,
        snapshot: &CompletionSnapshot,
    ) -> Result<bool, EngineError> {
        let graph = self.pathway_graph(pathway_id)?;
        SatisfactionEvaluator::new(&graph).is_unlocked(activity_id, snapshot)
    }

    /// Explains an unlock decision group by group.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown pathways or activities.
    pub fn explain_unlock(
        &self,
        pathway_id: &PathwayId,
        activity_id: &ActivityId,
        snapshot: &CompletionSnapshot,
    ) -> Result<UnlockReport, EngineError> {
        let graph = self.pathway_graph(pathway_id)?;
        SatisfactionEvaluator::new(&graph).explain(activity_id, snapshot)
    }

    /// Lists the unlocked activities of a pathway for a participant snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownPathway`] when the pathway is not stored.
    pub fn unlocked_activities(
        &self,
        pathway_id: &PathwayId,
        snapshot: &CompletionSnapshot,
    ) -> Result<Vec<ActivityId>, EngineError> {
        let graph = self.pathway_graph(pathway_id)?;
        Ok(SatisfactionEvaluator::new(&graph).unlocked_activities(snapshot))
    }

    /// Computes a weighted rollup from caller-supplied entries.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for invalid weights or percentages
    /// and for more entries than a pathway may hold.
    pub fn compute_pathway_rollup(
        &self,
        entries: &[RollupEntry],
    ) -> Result<CompletionRollup, EngineError> {
        ensure_within("max_activities_per_pathway", self.config.limits.max_activities, entries.len())?;
        Ok(compute_rollup(entries)?)
    }

    /// Computes a participant's rollup for a stored pathway from activity
    /// weights and a completion snapshot. Activities without state count as 0%.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for unknown pathways, snapshot entries outside
    /// the pathway, and invalid percentages.
    pub fn compute_participant_rollup(
        &self,
        pathway_id: &PathwayId,
        snapshot: &CompletionSnapshot,
    ) -> Result<CompletionRollup, EngineError> {
        let graph = self.pathway_graph(pathway_id)?;
        let entries = pathway_entries(&graph, snapshot)?;
        Ok(compute_rollup(&entries)?)
    }

    /// Composes pathway rollups into a cohort rollup using the configured weighting.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for invalid percentages.
    pub fn compute_cohort_rollup(
        &self,
        parts: &[CompletionRollup],
    ) -> Result<CompletionRollup, EngineError> {
        Ok(compose_rollups(parts, self.config.cohort_weighting)?)
    }

    /// Normalizes a batch of edits and runs cycle detection over all of them.
    fn review(
        &self,
        graph: &PathwayGraph,
        edits: Vec<ActivityPrerequisites>,
    ) -> Result<(CycleCheck, BTreeMap<ActivityId, Vec<PrerequisiteGroup>>), EngineError> {
        let mut normalized = BTreeMap::new();
        for ActivityPrerequisites {
            activity_id,
            groups,
        } in edits
        {
            let groups = graph.normalize_groups(&activity_id, groups, &self.config.limits)?;
            if normalized.contains_key(&activity_id) {
                return Err(ValidationError::DuplicateGatedActivity(activity_id).into());
            }
            normalized.insert(activity_id, groups);
        }
        let proposed = normalized
            .iter()
            .map(|(activity_id, groups)| (activity_id.clone(), union_of_items(groups)))
            .collect();
        let check = CycleDetector::new(graph).check_edits(&proposed);
        Ok((check, normalized))
    }
}
