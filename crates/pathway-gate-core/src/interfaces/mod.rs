// crates/pathway-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Pathway Gate Interfaces
// Description: Storage seam between the engine facade and the host application.
// Purpose: Let hosts rebuild or cache Graph Models without the engine caring which.
// Dependencies: crate::core, crate::runtime::graph, thiserror
// ============================================================================

//! ## Overview
//! The engine does no I/O of its own. Hosts supply a [`PathwayGraphStore`]
//! that hands back a consistent graph snapshot per call and persists accepted
//! edits. Serializing concurrent writers is the host's responsibility; the
//! store only has to return the latest saved snapshot.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::PathwayId;
use crate::runtime::graph::PathwayGraph;

// ============================================================================
// SECTION: Graph Store
// ============================================================================

/// Pathway graph storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend failure while loading or saving a graph.
    #[error("pathway graph store error: {0}")]
    Store(String),
}

/// Backend-agnostic storage for pathway Graph Models.
pub trait PathwayGraphStore {
    /// Loads the current graph snapshot for a pathway.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn load(&self, pathway_id: &PathwayId) -> Result<Option<PathwayGraph>, StoreError>;

    /// Persists a graph snapshot, replacing any previous one for the pathway.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backend fails.
    fn save(&self, graph: &PathwayGraph) -> Result<(), StoreError>;
}
