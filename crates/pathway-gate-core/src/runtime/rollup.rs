// crates/pathway-gate-core/src/runtime/rollup.rs
// ============================================================================
// Module: Pathway Gate Completion Rollups
// Description: Weighted completion aggregation for pathways and cohorts.
// Purpose: Compute fresh weighted percentages from per-entry weights and progress.
// Dependencies: crate::core, crate::runtime::{engine, graph}, serde
// ============================================================================

//! ## Overview
//! A rollup is `sum(weight * percent) / sum(weight)`, clamped to `[0, 100]`,
//! with `0` reported when the total weight is zero. The same formula applies
//! at every level: pathway rollups are built from activities, and cohort
//! rollups re-apply it to pathway rollups. Results keep full `f64` precision;
//! rounding for display is the caller's concern. Nothing here is cached.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::CompletionSnapshot;
use crate::core::ValidationError;
use crate::runtime::engine::EngineError;
use crate::runtime::graph::PathwayGraph;
use crate::runtime::graph::is_valid_weight;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Lower bound of a rollup percentage.
const MIN_PERCENT: f64 = 0.0;
/// Upper bound of a rollup percentage.
const MAX_PERCENT: f64 = 100.0;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One weighted input to a rollup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollupEntry {
    /// Non-negative weight.
    pub weight: f64,
    /// Completion percentage of the entry.
    pub completion_percent: f64,
}

impl RollupEntry {
    /// Creates a rollup entry.
    #[must_use]
    pub const fn new(weight: f64, completion_percent: f64) -> Self {
        Self {
            weight,
            completion_percent,
        }
    }

    /// Lifts a lower-level rollup into an entry for the next level.
    #[must_use]
    pub const fn from_rollup(rollup: &CompletionRollup, weight: f64) -> Self {
        Self::new(weight, rollup.percent)
    }
}

/// Weighted completion result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionRollup {
    /// Weighted percentage in `[0, 100]`.
    pub percent: f64,
    /// Entries with a weight above zero.
    pub contributing_count: usize,
}

/// Weight assigned to each pathway rollup when composing a cohort rollup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortWeighting {
    /// Every pathway weighs the same.
    #[default]
    Equal,
    /// Pathways weigh by their contributing activity count.
    ContributingCount,
}

// ============================================================================
// SECTION: Calculator
// ============================================================================

/// Computes a weighted rollup.
///
/// # Errors
///
/// Returns [`ValidationError`] for negative or non-finite weights, non-finite
/// percentages, or when the weighted sums overflow.
pub fn compute_rollup(entries: &[RollupEntry]) -> Result<CompletionRollup, ValidationError> {
    let mut total_weight = 0.0_f64;
    let mut weighted_sum = 0.0_f64;
    let mut contributing_count = 0usize;

    for entry in entries {
        if !is_valid_weight(entry.weight) {
            return Err(ValidationError::InvalidWeight(entry.weight));
        }
        if !entry.completion_percent.is_finite() {
            return Err(ValidationError::InvalidCompletionPercent(entry.completion_percent));
        }
        if entry.weight > 0.0 {
            contributing_count += 1;
            total_weight += entry.weight;
            weighted_sum += entry.weight * entry.completion_percent;
        }
    }

    if total_weight <= 0.0 {
        return Ok(CompletionRollup {
            percent: MIN_PERCENT,
            contributing_count,
        });
    }

    let percent = weighted_sum / total_weight;
    if !percent.is_finite() {
        return Err(ValidationError::RollupOverflow);
    }

    Ok(CompletionRollup {
        percent: percent.clamp(MIN_PERCENT, MAX_PERCENT),
        contributing_count,
    })
}

/// Composes lower-level rollups using a weighting policy.
///
/// # Errors
///
/// Returns [`ValidationError`] under the same conditions as [`compute_rollup`].
pub fn compose_rollups(
    parts: &[CompletionRollup],
    weighting: CohortWeighting,
) -> Result<CompletionRollup, ValidationError> {
    let entries: Vec<RollupEntry> = parts
        .iter()
        .map(|part| {
            let weight = match weighting {
                CohortWeighting::Equal => 1.0,
                CohortWeighting::ContributingCount => count_as_weight(part.contributing_count),
            };
            RollupEntry::from_rollup(part, weight)
        })
        .collect();
    compute_rollup(&entries)
}

/// Builds pathway rollup entries from activity weights and a participant snapshot.
///
/// Activities missing from the snapshot contribute 0%.
///
/// # Errors
///
/// Returns [`EngineError::UnknownActivity`] when the snapshot names an
/// activity outside the pathway.
pub fn pathway_entries(
    graph: &PathwayGraph,
    snapshot: &CompletionSnapshot,
) -> Result<Vec<RollupEntry>, EngineError> {
    for (activity_id, _) in snapshot {
        graph.require_activity(activity_id)?;
    }
    Ok(graph
        .activities()
        .map(|activity| {
            let percent = snapshot
                .get(&activity.activity_id)
                .map_or(MIN_PERCENT, |state| state.completion_percent);
            RollupEntry::new(activity.weight, percent)
        })
        .collect())
}

/// Converts an activity count into a rollup weight.
fn count_as_weight(count: usize) -> f64 {
    u32::try_from(count).map_or(f64::from(u32::MAX), f64::from)
}
