// crates/pathway-gate-audit/src/lib.rs
// ============================================================================
// Module: Pathway Gate Audit Library
// Description: Audit events, sinks, and an auditing engine wrapper.
// Purpose: Record engine outcomes for hosts without adding I/O to the engine.
// Dependencies: pathway-gate-core, pathway-gate-config, serde_json
// ============================================================================

//! ## Overview
//! The engine never logs. Hosts that need an audit trail wrap it in
//! [`AuditedEngine`], which forwards each call and records a structured event
//! after the engine returns. Events are JSON lines routed to an [`AuditSink`]
//! chosen from configuration.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod engine;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditError;
pub use audit::AuditRecord;
pub use audit::AuditSink;
pub use audit::EditOutcome;
pub use audit::FileAuditSink;
pub use audit::InMemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::PrerequisiteEditEvent;
pub use audit::PrerequisiteEditEventParams;
pub use audit::RollupEvent;
pub use audit::RollupEventParams;
pub use audit::RollupLevel;
pub use audit::StderrAuditSink;
pub use audit::UnlockEvaluationEvent;
pub use audit::UnlockEvaluationEventParams;
pub use audit::error_kind;
pub use audit::sink_from_config;
pub use engine::AuditedEngine;
