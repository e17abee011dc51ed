// crates/pathway-gate-audit/src/audit.rs
// ============================================================================
// Module: Pathway Gate Audit Logging
// Description: Structured audit events for prerequisite edits, unlocks, and rollups.
// Purpose: Emit JSON-line audit records without hard logging dependencies.
// Dependencies: pathway-gate-core, pathway-gate-config, serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks. Events carry
//! structured data only (identifiers, outcomes, cycle paths, fingerprints);
//! turning a cycle path into an operator-facing message is the admin layer's
//! job. Sinks are lightweight so deployments can route events to their
//! preferred logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use pathway_gate_config::AuditConfig;
use pathway_gate_config::AuditSinkKind;
use pathway_gate_core::ActivityId;
use pathway_gate_core::EngineError;
use pathway_gate_core::HashDigest;
use pathway_gate_core::PathwayId;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a prerequisite edit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    /// The edit keeps the graph acyclic. It was committed unless it was a dry run.
    Accepted,
    /// The edit would have closed a cycle; nothing was committed.
    Rejected,
    /// The edit failed validation or lookup; nothing was committed.
    Invalid,
}

/// Aggregation level of a rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupLevel {
    /// Rollup over one pathway's activities.
    Pathway,
    /// Rollup composed from pathway rollups.
    Cohort,
    /// Rollup over caller-supplied weighted entries.
    Entries,
}

/// Prerequisite edit audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrerequisiteEditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Pathway identifier.
    pub pathway_id: PathwayId,
    /// Activities whose groups were proposed.
    pub activity_ids: Vec<ActivityId>,
    /// Whether the edit was only validated and never committed.
    pub dry_run: bool,
    /// Edit outcome.
    pub outcome: EditOutcome,
    /// Cycle path for rejected edits.
    pub cycle_path: Vec<ActivityId>,
    /// Normalized error kind label for invalid edits.
    pub error_kind: Option<&'static str>,
    /// Graph fingerprint before the attempt.
    pub fingerprint_before: Option<HashDigest>,
    /// Graph fingerprint after the attempt.
    pub fingerprint_after: Option<HashDigest>,
}

/// Unlock evaluation audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnlockEvaluationEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Pathway identifier.
    pub pathway_id: PathwayId,
    /// Evaluated activity.
    pub activity_id: ActivityId,
    /// Unlock decision when evaluation succeeded.
    pub unlocked: Option<bool>,
    /// Normalized error kind label when evaluation failed.
    pub error_kind: Option<&'static str>,
}

/// Rollup audit event payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Aggregation level.
    pub level: RollupLevel,
    /// Pathway identifier for participant rollups.
    pub pathway_id: Option<PathwayId>,
    /// Rollup percentage when computation succeeded.
    pub percent: Option<f64>,
    /// Contributing entries when computation succeeded.
    pub contributing_count: Option<usize>,
    /// Normalized error kind label when computation failed.
    pub error_kind: Option<&'static str>,
}

/// Inputs required to construct a prerequisite edit event.
pub struct PrerequisiteEditEventParams {
    /// Pathway identifier.
    pub pathway_id: PathwayId,
    /// Activities whose groups were proposed.
    pub activity_ids: Vec<ActivityId>,
    /// Whether the edit was only validated and never committed.
    pub dry_run: bool,
    /// Edit outcome.
    pub outcome: EditOutcome,
    /// Cycle path for rejected edits.
    pub cycle_path: Vec<ActivityId>,
    /// Normalized error kind label for invalid edits.
    pub error_kind: Option<&'static str>,
    /// Graph fingerprint before the attempt.
    pub fingerprint_before: Option<HashDigest>,
    /// Graph fingerprint after the attempt.
    pub fingerprint_after: Option<HashDigest>,
}

/// Inputs required to construct an unlock evaluation event.
pub struct UnlockEvaluationEventParams {
    /// Pathway identifier.
    pub pathway_id: PathwayId,
    /// Evaluated activity.
    pub activity_id: ActivityId,
    /// Unlock decision when evaluation succeeded.
    pub unlocked: Option<bool>,
    /// Normalized error kind label when evaluation failed.
    pub error_kind: Option<&'static str>,
}

/// Inputs required to construct a rollup event.
pub struct RollupEventParams {
    /// Aggregation level.
    pub level: RollupLevel,
    /// Pathway identifier for participant rollups.
    pub pathway_id: Option<PathwayId>,
    /// Rollup percentage when computation succeeded.
    pub percent: Option<f64>,
    /// Contributing entries when computation succeeded.
    pub contributing_count: Option<usize>,
    /// Normalized error kind label when computation failed.
    pub error_kind: Option<&'static str>,
}

impl PrerequisiteEditEvent {
    /// Creates a new prerequisite edit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: PrerequisiteEditEventParams) -> Self {
        Self {
            event: "prerequisite_edit",
            timestamp_ms: now_ms(),
            pathway_id: params.pathway_id,
            activity_ids: params.activity_ids,
            dry_run: params.dry_run,
            outcome: params.outcome,
            cycle_path: params.cycle_path,
            error_kind: params.error_kind,
            fingerprint_before: params.fingerprint_before,
            fingerprint_after: params.fingerprint_after,
        }
    }
}

impl UnlockEvaluationEvent {
    /// Creates a new unlock evaluation event with a consistent timestamp.
    #[must_use]
    pub fn new(params: UnlockEvaluationEventParams) -> Self {
        Self {
            event: "unlock_evaluation",
            timestamp_ms: now_ms(),
            pathway_id: params.pathway_id,
            activity_id: params.activity_id,
            unlocked: params.unlocked,
            error_kind: params.error_kind,
        }
    }
}

impl RollupEvent {
    /// Creates a new rollup event with a consistent timestamp.
    #[must_use]
    pub fn new(params: RollupEventParams) -> Self {
        Self {
            event: "rollup_computed",
            timestamp_ms: now_ms(),
            level: params.level,
            pathway_id: params.pathway_id,
            percent: params.percent,
            contributing_count: params.contributing_count,
            error_kind: params.error_kind,
        }
    }
}

/// Any audit event, serialized without an extra wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuditRecord {
    /// Prerequisite edit attempt.
    Edit(PrerequisiteEditEvent),
    /// Unlock evaluation.
    Unlock(UnlockEvaluationEvent),
    /// Rollup computation.
    Rollup(RollupEvent),
}

impl AuditRecord {
    /// Returns the event identifier.
    #[must_use]
    pub const fn event(&self) -> &'static str {
        match self {
            Self::Edit(event) => event.event,
            Self::Unlock(event) => event.event,
            Self::Rollup(event) => event.event,
        }
    }
}

/// Returns a stable label for an engine error.
#[must_use]
pub const fn error_kind(error: &EngineError) -> &'static str {
    match error {
        EngineError::Validation(_) => "validation",
        EngineError::UnknownActivity {
            ..
        } => "unknown_activity",
        EngineError::UnknownPathway(_) => "unknown_pathway",
        EngineError::Store(_) => "store",
        EngineError::Hash(_) => "hash",
    }
}

/// Milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Audit sink construction errors.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit file could not be opened.
    #[error("audit io error: {0}")]
    Io(String),
    /// The audit configuration is incomplete.
    #[error("invalid audit config: {0}")]
    Config(String),
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for engine events.
pub trait AuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, record: &AuditRecord);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(payload) = serde_json::to_string(record) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Io`] if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| AuditError::Io(err.to_string()))?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(payload) = serde_json::to_string(record)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Audit sink that keeps events in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    /// Recorded events in arrival order.
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: &AuditRecord) {}
}

/// Builds the sink selected by configuration.
///
/// # Errors
///
/// Returns [`AuditError`] when the file sink has no path or cannot be opened.
pub fn sink_from_config(config: &AuditConfig) -> Result<Arc<dyn AuditSink>, AuditError> {
    match config.sink {
        AuditSinkKind::Disabled => Ok(Arc::new(NoopAuditSink)),
        AuditSinkKind::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkKind::File => {
            let path = config
                .path
                .as_deref()
                .ok_or_else(|| AuditError::Config("audit.path is required for the file sink".to_string()))?;
            Ok(Arc::new(FileAuditSink::new(Path::new(path.trim()))?))
        }
    }
}
