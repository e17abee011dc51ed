// crates/pathway-gate-core/src/lib.rs
// ============================================================================
// Module: Pathway Gate Core Library
// Description: Public API surface for the prerequisite and rollup engine.
// Purpose: Expose core types, interfaces, and runtime components.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Pathway Gate decides, for activities grouped into pathways, whether a
//! participant may start an activity and how far along a participant is.
//! It guards the prerequisite graph against cycles at edit time, evaluates
//! `all_of` / `any_of` / `n_of_m` prerequisite groups, and computes weighted
//! completion rollups. The engine is synchronous, performs no I/O of its own,
//! and never logs; hosts persist graphs through [`PathwayGraphStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::PathwayGraphStore;
pub use interfaces::StoreError;
pub use runtime::CohortWeighting;
pub use runtime::CompletionRollup;
pub use runtime::CycleCheck;
pub use runtime::CycleDetector;
pub use runtime::EngineConfig;
pub use runtime::EngineError;
pub use runtime::GraphLimits;
pub use runtime::GroupOutcome;
pub use runtime::InMemoryPathwayGraphStore;
pub use runtime::PathwayGraph;
pub use runtime::PrerequisiteEngine;
pub use runtime::RollupEntry;
pub use runtime::SatisfactionEvaluator;
pub use runtime::UnlockReport;
pub use runtime::compose_rollups;
pub use runtime::compute_rollup;
