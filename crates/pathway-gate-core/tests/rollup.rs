// crates/pathway-gate-core/tests/rollup.rs
// ============================================================================
// Module: Completion Rollup Tests
// Description: Weighted averages, zero-weight pathways, and composition.
// Purpose: Ensure rollups are well defined for every finite input.
// Dependencies: pathway-gate-core
// ============================================================================
//! ## Overview
//! Checks the weighted rollup formula, clamping, input validation, and
//! recursive composition of pathway rollups into cohort rollups.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use pathway_gate_core::CohortWeighting;
use pathway_gate_core::CompletionRollup;
use pathway_gate_core::RollupEntry;
use pathway_gate_core::ValidationError;
use pathway_gate_core::compose_rollups;
use pathway_gate_core::compute_rollup;

// ============================================================================
// SECTION: Weighted Average
// ============================================================================

#[test]
fn weighted_average_matches_formula() {
    let rollup =
        compute_rollup(&[RollupEntry::new(1.0, 100.0), RollupEntry::new(3.0, 0.0)]).expect("rollup");

    assert_eq!(rollup.percent, 25.0);
    assert_eq!(rollup.contributing_count, 2);
}

#[test]
fn zero_total_weight_reports_zero() {
    let rollup =
        compute_rollup(&[RollupEntry::new(0.0, 100.0), RollupEntry::new(0.0, 50.0)]).expect("rollup");

    assert_eq!(rollup.percent, 0.0);
    assert_eq!(rollup.contributing_count, 0);
}

#[test]
fn empty_entries_report_zero() {
    let rollup = compute_rollup(&[]).expect("rollup");

    assert_eq!(
        rollup,
        CompletionRollup {
            percent: 0.0,
            contributing_count: 0,
        }
    );
}

#[test]
fn zero_weight_entries_do_not_contribute() {
    let rollup = compute_rollup(&[
        RollupEntry::new(2.0, 40.0),
        RollupEntry::new(0.0, 100.0),
        RollupEntry::new(2.0, 60.0),
    ])
    .expect("rollup");

    assert_eq!(rollup.percent, 50.0);
    assert_eq!(rollup.contributing_count, 2);
}

#[test]
fn result_is_clamped_to_percent_range() {
    let high = compute_rollup(&[RollupEntry::new(1.0, 180.0)]).expect("rollup");
    let low = compute_rollup(&[RollupEntry::new(1.0, -20.0)]).expect("rollup");

    assert_eq!(high.percent, 100.0);
    assert_eq!(low.percent, 0.0);
}

#[test]
fn full_precision_is_kept() {
    let rollup = compute_rollup(&[
        RollupEntry::new(1.0, 100.0),
        RollupEntry::new(1.0, 0.0),
        RollupEntry::new(1.0, 0.0),
    ])
    .expect("rollup");

    assert_eq!(rollup.percent, 100.0 / 3.0);
}

// ============================================================================
// SECTION: Input Validation
// ============================================================================

#[test]
fn invalid_weights_are_rejected() {
    assert_eq!(
        compute_rollup(&[RollupEntry::new(-1.0, 10.0)]).unwrap_err(),
        ValidationError::InvalidWeight(-1.0)
    );
    assert!(matches!(
        compute_rollup(&[RollupEntry::new(f64::INFINITY, 10.0)]),
        Err(ValidationError::InvalidWeight(_))
    ));
    assert!(matches!(
        compute_rollup(&[RollupEntry::new(f64::NAN, 10.0)]),
        Err(ValidationError::InvalidWeight(_))
    ));
}

#[test]
fn non_finite_percent_is_rejected() {
    assert!(matches!(
        compute_rollup(&[RollupEntry::new(1.0, f64::NAN)]),
        Err(ValidationError::InvalidCompletionPercent(_))
    ));
}

#[test]
fn overflowing_sums_are_rejected() {
    let err = compute_rollup(&[RollupEntry::new(f64::MAX, 100.0), RollupEntry::new(f64::MAX, 100.0)])
        .unwrap_err();

    assert_eq!(err, ValidationError::RollupOverflow);
}

// ============================================================================
// SECTION: Composition
// ============================================================================

#[test]
fn equal_weighting_averages_pathways() {
    let parts = [
        CompletionRollup {
            percent: 100.0,
            contributing_count: 1,
        },
        CompletionRollup {
            percent: 50.0,
            contributing_count: 3,
        },
    ];

    let cohort = compose_rollups(&parts, CohortWeighting::Equal).expect("compose");

    assert_eq!(cohort.percent, 75.0);
    assert_eq!(cohort.contributing_count, 2);
}

#[test]
fn contributing_count_weighting_favors_larger_pathways() {
    let parts = [
        CompletionRollup {
            percent: 100.0,
            contributing_count: 1,
        },
        CompletionRollup {
            percent: 0.0,
            contributing_count: 3,
        },
        CompletionRollup {
            percent: 90.0,
            contributing_count: 0,
        },
    ];

    let cohort = compose_rollups(&parts, CohortWeighting::ContributingCount).expect("compose");

    assert_eq!(cohort.percent, 25.0);
    assert_eq!(cohort.contributing_count, 2);
}

#[test]
fn explicit_weights_compose_through_entries() {
    let pathway = compute_rollup(&[RollupEntry::new(1.0, 100.0), RollupEntry::new(1.0, 0.0)])
        .expect("pathway rollup");
    let other = compute_rollup(&[RollupEntry::new(1.0, 20.0)]).expect("pathway rollup");

    let cohort = compute_rollup(&[
        RollupEntry::from_rollup(&pathway, 3.0),
        RollupEntry::from_rollup(&other, 1.0),
    ])
    .expect("cohort rollup");

    assert_eq!(cohort.percent, 42.5);
}
