// crates/pathway-gate-core/src/runtime/cycle.rs
// ============================================================================
// Module: Pathway Gate Cycle Detector
// Description: Depth-first cycle detection over proposed prerequisite edits.
// Purpose: Gate every prerequisite edit on the acyclicity invariant.
// Dependencies: crate::core, crate::runtime::graph, serde
// ============================================================================

//! ## Overview
//! The detector overlays proposed edge sets onto a pathway's current edges
//! (edits replace an activity's edges wholesale, every other activity keeps
//! its own) and walks "is a prerequisite of" edges depth-first from each
//! edited activity. Because the current graph is already acyclic, any new
//! cycle must pass through an edited activity, so those are the only roots.
//!
//! Traversal keeps the active path and a finished set. Reaching a node that
//! is still on the path closes a cycle; the reported cycle runs from that
//! node's position on the path to the current node and repeats the node at
//! the end (`a -> b -> c -> a`). Each validation is `O(V + E)` and the walk is
//! iterative, so deep chains cannot exhaust the call stack.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::btree_set;

use serde::Deserialize;
use serde::Serialize;

use crate::core::ActivityId;
use crate::runtime::graph::PathwayGraph;

// ============================================================================
// SECTION: Cycle Check Result
// ============================================================================

/// Outcome of validating a prerequisite edit.
///
/// A rejected edit is an expected result, not an error: `valid` is false and
/// `cycle` holds the offending path for diagnostic display.
///
/// # Invariants
/// - `cycle` is empty exactly when `valid` is true.
/// - A non-empty `cycle` starts and ends with the same activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCheck {
    /// Whether the edit keeps the graph acyclic.
    pub valid: bool,
    /// Offending cycle in traversal order, closing back to its first activity.
    #[serde(rename = "cycle_path")]
    pub cycle: Vec<ActivityId>,
}

impl CycleCheck {
    /// Returns an accepted outcome.
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            valid: true,
            cycle: Vec::new(),
        }
    }

    /// Returns a rejected outcome carrying the cycle path.
    #[must_use]
    pub const fn rejected(cycle: Vec<ActivityId>) -> Self {
        Self {
            valid: false,
            cycle,
        }
    }

    /// Returns true when the edit was accepted.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

// ============================================================================
// SECTION: Cycle Detector
// ============================================================================

/// Validates proposed edge sets against a pathway's current graph.
#[derive(Debug, Clone, Copy)]
pub struct CycleDetector<'a> {
    /// Current graph snapshot.
    graph: &'a PathwayGraph,
}

impl<'a> CycleDetector<'a> {
    /// Creates a detector over a graph snapshot.
    #[must_use]
    pub const fn new(graph: &'a PathwayGraph) -> Self {
        Self {
            graph,
        }
    }

    /// Checks whether replacing `activity_id`'s prerequisite edges with
    /// `proposed` would close a cycle anywhere in the pathway.
    #[must_use]
    pub fn check_edit(&self, activity_id: &ActivityId, proposed: &BTreeSet<ActivityId>) -> CycleCheck {
        let overlay = BTreeMap::from([(activity_id.clone(), proposed.clone())]);
        self.check_edits(&overlay)
    }

    /// Checks several edge replacements applied together.
    #[must_use]
    pub fn check_edits(&self, proposed: &BTreeMap<ActivityId, BTreeSet<ActivityId>>) -> CycleCheck {
        let view = EdgeView::new(self.graph.edges(), Some(proposed));
        let roots = proposed
            .iter()
            .filter(|(_, prerequisites)| !prerequisites.is_empty())
            .map(|(activity_id, _)| activity_id);
        find_cycle(&view, roots).map_or_else(CycleCheck::accepted, CycleCheck::rejected)
    }
}

// ============================================================================
// SECTION: Edge View
// ============================================================================

/// Shared empty edge set for activities without prerequisites.
static NO_EDGES: BTreeSet<ActivityId> = BTreeSet::new();

/// Current edges with optional per-activity replacements layered on top.
pub(crate) struct EdgeView<'a> {
    /// Committed edges.
    base: &'a BTreeMap<ActivityId, BTreeSet<ActivityId>>,
    /// Proposed replacements keyed by edited activity.
    overlay: Option<&'a BTreeMap<ActivityId, BTreeSet<ActivityId>>>,
}

impl<'a> EdgeView<'a> {
    /// Creates a view over committed edges and optional replacements.
    pub(crate) const fn new(
        base: &'a BTreeMap<ActivityId, BTreeSet<ActivityId>>,
        overlay: Option<&'a BTreeMap<ActivityId, BTreeSet<ActivityId>>>,
    ) -> Self {
        Self {
            base,
            overlay,
        }
    }

    /// Iterates the prerequisites of an activity as seen through the overlay.
    fn prerequisites_of(&self, activity_id: &ActivityId) -> btree_set::Iter<'a, ActivityId> {
        if let Some(overlay) = self.overlay
            && let Some(proposed) = overlay.get(activity_id)
        {
            return proposed.iter();
        }
        self.base.get(activity_id).unwrap_or(&NO_EDGES).iter()
    }
}

// ============================================================================
// SECTION: Traversal
// ============================================================================

/// Walks prerequisite edges from each root and returns the first cycle found.
pub(crate) fn find_cycle<'a, I>(edges: &EdgeView<'a>, roots: I) -> Option<Vec<ActivityId>>
where
    I: IntoIterator<Item = &'a ActivityId>,
{
    let mut finished: BTreeSet<&'a ActivityId> = BTreeSet::new();

    for root in roots {
        if finished.contains(root) {
            continue;
        }

        let mut path: Vec<&'a ActivityId> = vec![root];
        let mut on_path: BTreeSet<&'a ActivityId> = BTreeSet::from([root]);
        let mut frames = vec![edges.prerequisites_of(root)];

        while let Some(frame) = frames.last_mut() {
            if let Some(next) = frame.next() {
                if on_path.contains(next) {
                    let start = path.iter().position(|step| *step == next).unwrap_or_default();
                    let mut cycle: Vec<ActivityId> =
                        path[start ..].iter().map(|step| (*step).clone()).collect();
                    cycle.push(next.clone());
                    return Some(cycle);
                }
                if finished.contains(next) {
                    continue;
                }
                path.push(next);
                on_path.insert(next);
                frames.push(edges.prerequisites_of(next));
            } else {
                frames.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(done);
                    finished.insert(done);
                }
            }
        }
    }

    None
}
