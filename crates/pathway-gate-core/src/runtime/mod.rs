// crates/pathway-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Pathway Gate Runtime
// Description: Graph Model, cycle detection, unlock evaluation, and rollups.
// Purpose: Implement the engine behind the facade in `engine`.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold the pathway Graph Model and the three evaluators that
//! operate on it. External callers go through [`PrerequisiteEngine`]; the
//! individual components are public for hosts that manage graphs themselves.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cycle;
pub mod engine;
pub mod graph;
pub mod rollup;
pub mod satisfaction;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cycle::CycleCheck;
pub use cycle::CycleDetector;
pub use engine::EngineConfig;
pub use engine::EngineError;
pub use engine::PrerequisiteEngine;
pub use graph::DEFAULT_MAX_ACTIVITIES;
pub use graph::DEFAULT_MAX_GROUPS_PER_ACTIVITY;
pub use graph::DEFAULT_MAX_ITEMS_PER_GROUP;
pub use graph::GraphLimits;
pub use graph::PathwayGraph;
pub use rollup::CohortWeighting;
pub use rollup::CompletionRollup;
pub use rollup::RollupEntry;
pub use rollup::compose_rollups;
pub use rollup::compute_rollup;
pub use satisfaction::GroupOutcome;
pub use satisfaction::SatisfactionEvaluator;
pub use satisfaction::UnlockReport;
pub use store::InMemoryPathwayGraphStore;
