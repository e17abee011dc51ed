// crates/pathway-gate-audit/src/engine.rs
// ============================================================================
// Module: Pathway Gate Audited Engine
// Description: Engine facade wrapper that records audit events after each call.
// Purpose: Give hosts an audit trail while keeping the engine free of I/O.
// Dependencies: crate::audit, pathway-gate-core
// ============================================================================

//! ## Overview
//! [`AuditedEngine`] forwards edits, dry-run validations, unlock queries, and
//! rollups to a [`PrerequisiteEngine`] and records one event per call once the
//! engine has returned. The engine result is handed back unchanged; recording
//! never alters or fails the call. Snapshot loads and read-only graph or
//! explanation queries go through [`AuditedEngine::engine`] unrecorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use pathway_gate_core::ActivityId;
use pathway_gate_core::ActivityPrerequisites;
use pathway_gate_core::CompletionRollup;
use pathway_gate_core::CompletionSnapshot;
use pathway_gate_core::CycleCheck;
use pathway_gate_core::EngineError;
use pathway_gate_core::HashDigest;
use pathway_gate_core::PathwayGraphStore;
use pathway_gate_core::PathwayId;
use pathway_gate_core::PrerequisiteEngine;
use pathway_gate_core::PrerequisiteGroup;
use pathway_gate_core::RollupEntry;

use crate::audit::AuditRecord;
use crate::audit::AuditSink;
use crate::audit::EditOutcome;
use crate::audit::PrerequisiteEditEvent;
use crate::audit::PrerequisiteEditEventParams;
use crate::audit::RollupEvent;
use crate::audit::RollupEventParams;
use crate::audit::RollupLevel;
use crate::audit::UnlockEvaluationEvent;
use crate::audit::UnlockEvaluationEventParams;
use crate::audit::error_kind;

// ============================================================================
// SECTION: Audited Engine
// ============================================================================

/// Engine facade that records an audit event after every call.
pub struct AuditedEngine<S> {
    /// Wrapped engine.
    engine: PrerequisiteEngine<S>,
    /// Audit sink.
    sink: Arc<dyn AuditSink>,
}

impl<S: PathwayGraphStore> AuditedEngine<S> {
    /// Wraps an engine with an audit sink.
    #[must_use]
    pub fn new(engine: PrerequisiteEngine<S>, sink: Arc<dyn AuditSink>) -> Self {
        Self {
            engine,
            sink,
        }
    }

    /// Returns the wrapped engine for calls that need no audit record.
    #[must_use]
    pub const fn engine(&self) -> &PrerequisiteEngine<S> {
        &self.engine
    }

    /// Proposes a single group replacement and records the outcome.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
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

    /// Proposes a batch of group replacements and records the outcome.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn propose_prerequisite_changes(
        &self,
        pathway_id: &PathwayId,
        edits: Vec<ActivityPrerequisites>,
    ) -> Result<CycleCheck, EngineError> {
        let activity_ids = edits.iter().map(|edit| edit.activity_id.clone()).collect();
        let fingerprint_before = self.fingerprint(pathway_id);
        let result = self.engine.propose_prerequisite_changes(pathway_id, edits);
        let fingerprint_after = self.fingerprint(pathway_id);
        self.record_edit(EditRecord {
            pathway_id,
            activity_ids,
            dry_run: false,
            result: &result,
            fingerprint_before,
            fingerprint_after,
        });
        result
    }

    /// Validates a single group replacement without committing it and
    /// records the outcome as a dry run.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
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

    /// Validates a batch of group replacements without committing them and
    /// records the outcome as a dry run.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn validate_prerequisite_edits(
        &self,
        pathway_id: &PathwayId,
        edits: Vec<ActivityPrerequisites>,
    ) -> Result<CycleCheck, EngineError> {
        let activity_ids = edits.iter().map(|edit| edit.activity_id.clone()).collect();
        let fingerprint = self.fingerprint(pathway_id);
        let result = self.engine.validate_prerequisite_edits(pathway_id, edits);
        self.record_edit(EditRecord {
            pathway_id,
            activity_ids,
            dry_run: true,
            result: &result,
            fingerprint_before: fingerprint.clone(),
            fingerprint_after: fingerprint,
        });
        result
    }

    /// Evaluates an unlock decision and records it.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn is_activity_unlocked(
        &self,
        pathway_id: &PathwayId,
        activity_id: &ActivityId,
        snapshot: &CompletionSnapshot,
    ) -> Result<bool, EngineError> {
        let result = self.engine.is_activity_unlocked(pathway_id, activity_id, snapshot);
        self.sink.record(&AuditRecord::Unlock(UnlockEvaluationEvent::new(
            UnlockEvaluationEventParams {
                pathway_id: pathway_id.clone(),
                activity_id: activity_id.clone(),
                unlocked: result.as_ref().ok().copied(),
                error_kind: result.as_ref().err().map(error_kind),
            },
        )));
        result
    }

    /// Computes a participant's pathway rollup and records it.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn compute_participant_rollup(
        &self,
        pathway_id: &PathwayId,
        snapshot: &CompletionSnapshot,
    ) -> Result<CompletionRollup, EngineError> {
        let result = self.engine.compute_participant_rollup(pathway_id, snapshot);
        self.record_rollup(RollupLevel::Pathway, Some(pathway_id.clone()), &result);
        result
    }

    /// Computes a rollup from caller-supplied entries and records it.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn compute_pathway_rollup(
        &self,
        entries: &[RollupEntry],
    ) -> Result<CompletionRollup, EngineError> {
        let result = self.engine.compute_pathway_rollup(entries);
        self.record_rollup(RollupLevel::Entries, None, &result);
        result
    }

    /// Composes a cohort rollup and records it.
    ///
    /// # Errors
    ///
    /// Returns the engine's [`EngineError`] unchanged.
    pub fn compute_cohort_rollup(
        &self,
        parts: &[CompletionRollup],
    ) -> Result<CompletionRollup, EngineError> {
        let result = self.engine.compute_cohort_rollup(parts);
        self.record_rollup(RollupLevel::Cohort, None, &result);
        result
    }

    /// Records an edit event for a committed, rejected, or failed edit.
    fn record_edit(&self, record: EditRecord<'_>) {
        let (outcome, cycle_path, kind) = match record.result {
            Ok(check) if check.is_valid() => (EditOutcome::Accepted, Vec::new(), None),
            Ok(check) => (EditOutcome::Rejected, check.cycle.clone(), None),
            Err(err) => (EditOutcome::Invalid, Vec::new(), Some(error_kind(err))),
        };
        self.sink.record(&AuditRecord::Edit(PrerequisiteEditEvent::new(
            PrerequisiteEditEventParams {
                pathway_id: record.pathway_id.clone(),
                activity_ids: record.activity_ids,
                dry_run: record.dry_run,
                outcome,
                cycle_path,
                error_kind: kind,
                fingerprint_before: record.fingerprint_before,
                fingerprint_after: record.fingerprint_after,
            },
        )));
    }

    /// Records a rollup event for a computed or failed rollup.
    fn record_rollup(
        &self,
        level: RollupLevel,
        pathway_id: Option<PathwayId>,
        result: &Result<CompletionRollup, EngineError>,
    ) {
        let rollup = result.as_ref().ok();
        self.sink.record(&AuditRecord::Rollup(RollupEvent::new(RollupEventParams {
            level,
            pathway_id,
            percent: rollup.map(|rollup| rollup.percent),
            contributing_count: rollup.map(|rollup| rollup.contributing_count),
            error_kind: result.as_ref().err().map(error_kind),
        })));
    }

    /// Current graph fingerprint, when the pathway is stored.
    fn fingerprint(&self, pathway_id: &PathwayId) -> Option<HashDigest> {
        self.engine.pathway_graph(pathway_id).ok().and_then(|graph| graph.fingerprint().ok())
    }
}

/// Edit attempt details gathered around an engine call.
struct EditRecord<'a> {
    /// Pathway identifier.
    pathway_id: &'a PathwayId,
    /// Activities whose groups were proposed.
    activity_ids: Vec<ActivityId>,
    /// Whether the edit was only validated.
    dry_run: bool,
    /// Engine result for the attempt.
    result: &'a Result<CycleCheck, EngineError>,
    /// Graph fingerprint before the attempt.
    fingerprint_before: Option<HashDigest>,
    /// Graph fingerprint after the attempt.
    fingerprint_after: Option<HashDigest>,
}
