// crates/pathway-gate-core/src/core/mod.rs
// ============================================================================
// Module: Pathway Gate Core Types
// Description: Canonical activity, prerequisite, and completion structures.
// Purpose: Provide stable, serializable types for the engine contracts.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! Core types are the plain data the host exchanges with the engine: activity
//! snapshots, prerequisite groups, completion snapshots, and the validation
//! errors raised when any of them are malformed.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod activity;
pub mod completion;
pub mod hashing;
pub mod identifiers;
pub mod prerequisite;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use activity::Activity;
pub use activity::DEFAULT_ACTIVITY_WEIGHT;
pub use activity::PathwayDefinition;
pub use completion::ActivityCompletionState;
pub use completion::CompletionSnapshot;
pub use completion::CompletionStatus;
pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::ActivityId;
pub use identifiers::PathwayId;
pub use prerequisite::ActivityPrerequisites;
pub use prerequisite::GroupShapeError;
pub use prerequisite::PrereqRule;
pub use prerequisite::PrerequisiteGroup;
pub use validation::ValidationError;
