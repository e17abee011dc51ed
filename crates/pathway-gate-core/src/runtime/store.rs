// crates/pathway-gate-core/src/runtime/store.rs
// ============================================================================
// Module: Pathway Gate In-Memory Store
// Description: Mutex-guarded pathway graph store for hosts, tests, and demos.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces, crate::runtime::graph
// ============================================================================

//! ## Overview
//! [`InMemoryPathwayGraphStore`] keeps one graph snapshot per pathway.
//! Clones share the same map, so a host can hand one clone to the engine
//! and keep another for inspection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::PathwayId;
use crate::interfaces::PathwayGraphStore;
use crate::interfaces::StoreError;
use crate::runtime::graph::PathwayGraph;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Error message reported when the graph map mutex is poisoned.
const POISONED: &str = "pathway graph store mutex poisoned";

/// In-memory pathway graph store.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPathwayGraphStore {
    /// Graph map protected by a mutex.
    graphs: Arc<Mutex<BTreeMap<PathwayId, PathwayGraph>>>,
}

impl InMemoryPathwayGraphStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graphs: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns the identifiers of every stored pathway.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the mutex is poisoned.
    pub fn pathway_ids(&self) -> Result<Vec<PathwayId>, StoreError> {
        let guard = self.graphs.lock().map_err(|_| StoreError::Store(POISONED.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

impl PathwayGraphStore for InMemoryPathwayGraphStore {
    fn load(&self, pathway_id: &PathwayId) -> Result<Option<PathwayGraph>, StoreError> {
        let guard = self.graphs.lock().map_err(|_| StoreError::Store(POISONED.to_string()))?;
        Ok(guard.get(pathway_id).cloned())
    }

    fn save(&self, graph: &PathwayGraph) -> Result<(), StoreError> {
        self.graphs
            .lock()
            .map_err(|_| StoreError::Store(POISONED.to_string()))?
            .insert(graph.pathway_id().clone(), graph.clone());
        Ok(())
    }
}
