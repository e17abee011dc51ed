// crates/pathway-gate-config/src/lib.rs
// ============================================================================
// Module: Pathway Gate Config Library
// Description: Canonical configuration model and validation.
// Purpose: Single source of truth for pathway-gate.toml semantics.
// Dependencies: pathway-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `pathway-gate-config` defines the configuration model for hosts embedding
//! the Pathway Gate engine: structural limits, cohort rollup weighting, and
//! audit sink selection. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
