// crates/pathway-gate-core/tests/engine.rs
// ============================================================================
// Module: Engine Facade Tests
// Description: Prerequisite edits, unlock queries, and rollups through the facade.
// Purpose: Ensure edits are all-or-nothing and queries use the stored graph.
// Dependencies: pathway-gate-core
// ============================================================================
//! ## Overview
//! Drives [`PrerequisiteEngine`] over the in-memory store: accepted edits are
//! persisted, rejected and invalid edits leave the stored graph untouched,
//! and unlock and rollup queries reflect every accepted edit.

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

use std::collections::BTreeSet;
use std::error::Error;

use pathway_gate_core::Activity;
use pathway_gate_core::ActivityCompletionState;
use pathway_gate_core::ActivityId;
use pathway_gate_core::ActivityPrerequisites;
use pathway_gate_core::CohortWeighting;
use pathway_gate_core::CompletionRollup;
use pathway_gate_core::CompletionSnapshot;
use pathway_gate_core::EngineConfig;
use pathway_gate_core::EngineError;
use pathway_gate_core::GraphLimits;
use pathway_gate_core::InMemoryPathwayGraphStore;
use pathway_gate_core::PathwayDefinition;
use pathway_gate_core::PathwayId;
use pathway_gate_core::PrerequisiteEngine;
use pathway_gate_core::PrerequisiteGroup;
use pathway_gate_core::RollupEntry;
use pathway_gate_core::ValidationError;

/// Result type for fallible tests.
type TestResult = Result<(), Box<dyn Error>>;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Creates an engine with pathway `p1`: `a`, `b`, `c` (weight 2), `d`, and `b -> a`.
fn engine() -> Result<PrerequisiteEngine<InMemoryPathwayGraphStore>, EngineError> {
    engine_with(EngineConfig::default())
}

/// Creates the sample engine with a custom configuration.
fn engine_with(
    config: EngineConfig,
) -> Result<PrerequisiteEngine<InMemoryPathwayGraphStore>, EngineError> {
    let engine = PrerequisiteEngine::new(InMemoryPathwayGraphStore::new(), config);
    engine.load_pathway(
        PathwayDefinition::new(
            "p1",
            vec![
                Activity::new("p1", "a"),
                Activity::new("p1", "b"),
                Activity::new("p1", "c").with_weight(2.0),
                Activity::new("p1", "d"),
            ],
        )
        .with_prerequisites(vec![ActivityPrerequisites::new(
            "b",
            vec![PrerequisiteGroup::all_of(["a"])],
        )]),
    )?;
    Ok(engine)
}

/// Shorthand for the sample pathway id.
fn p1() -> PathwayId {
    PathwayId::from("p1")
}

/// Shorthand for an activity id.
fn id(value: &str) -> ActivityId {
    ActivityId::from(value)
}

// ============================================================================
// SECTION: Prerequisite Edits
// ============================================================================

#[test]
fn accepted_edit_is_persisted() -> TestResult {
    let engine = engine()?;

    let check =
        engine.propose_prerequisite_change(&p1(), &id("c"), vec![PrerequisiteGroup::any_of(["a", "b"])])?;

    assert!(check.is_valid());
    let graph = engine.pathway_graph(&p1())?;
    let expected: BTreeSet<ActivityId> = [id("a"), id("b")].into_iter().collect();
    assert_eq!(graph.get_prerequisite_activity_ids(&id("c")), expected);
    Ok(())
}

#[test]
fn rejected_edit_leaves_graph_unchanged() -> TestResult {
    let engine = engine()?;
    engine.propose_prerequisite_change(&p1(), &id("c"), vec![PrerequisiteGroup::all_of(["b"])])?;
    let before = engine.pathway_graph(&p1())?;

    let check = engine.propose_prerequisite_change(&p1(), &id("a"), vec![PrerequisiteGroup::all_of(["c"])])?;

    assert!(!check.is_valid());
    assert_eq!(check.cycle, vec![id("a"), id("c"), id("b"), id("a")]);
    let after = engine.pathway_graph(&p1())?;
    assert_eq!(after, before);
    assert_eq!(after.fingerprint()?, before.fingerprint()?);
    Ok(())
}

#[test]
fn batch_edit_closing_a_cycle_commits_nothing() -> TestResult {
    let engine = PrerequisiteEngine::new(InMemoryPathwayGraphStore::new(), EngineConfig::default());
    engine.load_pathway(
        PathwayDefinition::new(
            "p2",
            ["a", "b", "c"].into_iter().map(|activity| Activity::new("p2", activity)).collect(),
        )
        .with_prerequisites(vec![ActivityPrerequisites::new("b", vec![PrerequisiteGroup::all_of(["c"])])]),
    )?;
    let pathway = PathwayId::from("p2");
    let before = engine.pathway_graph(&pathway)?.fingerprint()?;

    let check = engine.propose_prerequisite_changes(
        &pathway,
        vec![
            ActivityPrerequisites::new("a", vec![PrerequisiteGroup::all_of(["b"])]),
            ActivityPrerequisites::new("c", vec![PrerequisiteGroup::any_of(["a"])]),
        ],
    )?;

    assert!(!check.is_valid());
    assert_eq!(check.cycle, vec![id("a"), id("b"), id("c"), id("a")]);
    assert_eq!(engine.pathway_graph(&pathway)?.fingerprint()?, before);
    Ok(())
}

#[test]
fn resubmitting_an_accepted_edit_is_idempotent() -> TestResult {
    let engine = engine()?;
    let groups = vec![PrerequisiteGroup::n_of_m(1, ["a", "b"])];
    assert!(engine.propose_prerequisite_change(&p1(), &id("d"), groups.clone())?.is_valid());
    let first = engine.pathway_graph(&p1())?.fingerprint()?;

    let check = engine.propose_prerequisite_change(&p1(), &id("d"), groups)?;

    assert!(check.is_valid());
    assert_eq!(engine.pathway_graph(&p1())?.fingerprint()?, first);
    Ok(())
}

#[test]
fn self_reference_is_a_validation_error() -> TestResult {
    let engine = engine()?;
    let before = engine.pathway_graph(&p1())?;

    let err = engine
        .propose_prerequisite_change(&p1(), &id("c"), vec![PrerequisiteGroup::any_of(["a", "c"])])
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation(ValidationError::SelfReference {
            activity_id: id("c"),
        })
    );
    assert_eq!(engine.pathway_graph(&p1())?, before);
    Ok(())
}

#[test]
fn reference_outside_pathway_is_a_validation_error() -> TestResult {
    let engine = engine()?;

    let err = engine
        .propose_prerequisite_change(&p1(), &id("c"), vec![PrerequisiteGroup::all_of(["elsewhere"])])
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::Validation(ValidationError::ActivityOutsidePathway {
            activity_id: id("c"),
            prerequisite_activity_id: id("elsewhere"),
        })
    );
    Ok(())
}

#[test]
fn unknown_pathway_and_activity_are_reported() -> TestResult {
    let engine = engine()?;

    let err = engine.propose_prerequisite_change(&PathwayId::from("nope"), &id("a"), Vec::new()).unwrap_err();
    assert_eq!(err, EngineError::UnknownPathway(PathwayId::from("nope")));

    let err = engine.propose_prerequisite_change(&p1(), &id("zz"), Vec::new()).unwrap_err();
    assert_eq!(
        err,
        EngineError::UnknownActivity {
            pathway_id: p1(),
            activity_id: id("zz"),
        }
    );
    Ok(())
}

#[test]
fn repeated_activity_in_batch_is_rejected() -> TestResult {
    let engine = engine()?;

    let err = engine
        .propose_prerequisite_changes(
            &p1(),
            vec![
                ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["a"])]),
                ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["b"])]),
            ],
        )
        .unwrap_err();

    assert_eq!(err, EngineError::Validation(ValidationError::DuplicateGatedActivity(id("c"))));
    Ok(())
}

#[test]
fn dry_run_never_commits() -> TestResult {
    let engine = engine()?;
    let before = engine.pathway_graph(&p1())?;

    let check =
        engine.validate_prerequisite_edit(&p1(), &id("d"), vec![PrerequisiteGroup::all_of(["c"])])?;

    assert!(check.is_valid());
    assert_eq!(engine.pathway_graph(&p1())?, before);
    Ok(())
}

#[test]
fn batch_dry_run_reports_combined_cycle_without_committing() -> TestResult {
    let engine = engine()?;
    let before = engine.pathway_graph(&p1())?;
    let edits = vec![
        ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["b"])]),
        ActivityPrerequisites::new("a", vec![PrerequisiteGroup::any_of(["c", "d"])]),
    ];

    let check = engine.validate_prerequisite_edits(&p1(), edits)?;

    assert!(!check.is_valid());
    assert_eq!(check.cycle.first(), check.cycle.last());
    assert!(check.cycle.contains(&id("c")));
    assert_eq!(engine.pathway_graph(&p1())?, before);

    let accepted = engine.validate_prerequisite_edits(
        &p1(),
        vec![
            ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["b"])]),
            ActivityPrerequisites::new("d", vec![PrerequisiteGroup::all_of(["c"])]),
        ],
    )?;
    assert!(accepted.is_valid());
    assert_eq!(engine.pathway_graph(&p1())?, before);
    Ok(())
}

#[test]
fn empty_group_list_clears_prerequisites() -> TestResult {
    let engine = engine()?;

    let check = engine.propose_prerequisite_change(&p1(), &id("b"), Vec::new())?;

    assert!(check.is_valid());
    let graph = engine.pathway_graph(&p1())?;
    assert!(graph.get_groups(&id("b")).is_empty());
    assert!(graph.get_dependent_activity_ids(&id("a")).is_empty());
    Ok(())
}

#[test]
fn group_limit_applies_to_edits() -> TestResult {
    let engine = engine_with(EngineConfig {
        limits: GraphLimits {
            max_groups_per_activity: 1,
            ..GraphLimits::default()
        },
        ..EngineConfig::default()
    })?;

    let err = engine
        .propose_prerequisite_change(
            &p1(),
            &id("d"),
            vec![PrerequisiteGroup::all_of(["a"]), PrerequisiteGroup::all_of(["b"])],
        )
        .unwrap_err();

    assert!(matches!(err, EngineError::Validation(ValidationError::LimitExceeded { .. })));
    Ok(())
}

#[test]
fn store_lists_loaded_pathways() -> TestResult {
    let engine = engine()?;

    engine.load_pathway(PathwayDefinition::new("p0", vec![Activity::new("p0", "solo")]))?;

    assert_eq!(engine.store().pathway_ids()?, vec![PathwayId::from("p0"), p1()]);
    Ok(())
}

#[test]
fn reloading_a_pathway_replaces_it() -> TestResult {
    let engine = engine()?;

    engine.load_pathway(PathwayDefinition::new("p1", vec![Activity::new("p1", "solo")]))?;

    let graph = engine.pathway_graph(&p1())?;
    assert_eq!(graph.activity_count(), 1);
    assert!(!graph.contains(&id("a")));
    Ok(())
}

// ============================================================================
// SECTION: Unlock Queries
// ============================================================================

#[test]
fn unlock_queries_follow_accepted_edits() -> TestResult {
    let engine = engine()?;
    let snapshot = CompletionSnapshot::new().with("a", ActivityCompletionState::complete());

    assert!(engine.is_activity_unlocked(&p1(), &id("c"), &snapshot)?);
    assert!(engine.is_activity_unlocked(&p1(), &id("d"), &snapshot)?);
    engine.propose_prerequisite_change(&p1(), &id("c"), vec![PrerequisiteGroup::all_of(["a"])])?;
    engine.propose_prerequisite_change(&p1(), &id("d"), vec![PrerequisiteGroup::all_of(["c"])])?;

    assert!(engine.is_activity_unlocked(&p1(), &id("c"), &snapshot)?);
    assert!(!engine.is_activity_unlocked(&p1(), &id("d"), &snapshot)?);
    assert_eq!(engine.unlocked_activities(&p1(), &snapshot)?, vec![id("a"), id("b"), id("c")]);

    let report = engine.explain_unlock(&p1(), &id("d"), &snapshot)?;
    assert!(!report.unlocked);
    assert_eq!(report.groups[0].pending, vec![id("c")]);
    Ok(())
}

#[test]
fn unlock_query_for_unknown_activity_fails() -> TestResult {
    let engine = engine()?;

    let err = engine.is_activity_unlocked(&p1(), &id("zz"), &CompletionSnapshot::new()).unwrap_err();

    assert!(matches!(err, EngineError::UnknownActivity { .. }));
    Ok(())
}

// ============================================================================
// SECTION: Rollups
// ============================================================================

#[test]
fn pathway_rollup_delegates_to_calculator() -> TestResult {
    let engine = engine()?;

    let rollup = engine.compute_pathway_rollup(&[RollupEntry::new(1.0, 100.0), RollupEntry::new(3.0, 0.0)])?;

    assert_eq!(rollup.percent, 25.0);
    assert_eq!(rollup.contributing_count, 2);
    Ok(())
}

#[test]
fn participant_rollup_uses_activity_weights() -> TestResult {
    let engine = engine()?;
    let snapshot = CompletionSnapshot::new()
        .with("a", ActivityCompletionState::complete())
        .with("c", ActivityCompletionState::in_progress(50.0));

    let rollup = engine.compute_participant_rollup(&p1(), &snapshot)?;

    // (1 * 100 + 1 * 0 + 2 * 50 + 1 * 0) / 5
    assert_eq!(rollup.percent, 40.0);
    assert_eq!(rollup.contributing_count, 4);
    Ok(())
}

#[test]
fn participant_rollup_rejects_foreign_activities() -> TestResult {
    let engine = engine()?;
    let snapshot = CompletionSnapshot::new().with("zz", ActivityCompletionState::complete());

    let err = engine.compute_participant_rollup(&p1(), &snapshot).unwrap_err();

    assert!(matches!(err, EngineError::UnknownActivity { .. }));
    Ok(())
}

#[test]
fn cohort_rollup_uses_configured_weighting() -> TestResult {
    let parts = [
        CompletionRollup {
            percent: 100.0,
            contributing_count: 1,
        },
        CompletionRollup {
            percent: 0.0,
            contributing_count: 3,
        },
    ];

    let equal = engine()?.compute_cohort_rollup(&parts)?;
    let by_count = engine_with(EngineConfig {
        cohort_weighting: CohortWeighting::ContributingCount,
        ..EngineConfig::default()
    })?
    .compute_cohort_rollup(&parts)?;

    assert_eq!(equal.percent, 50.0);
    assert_eq!(by_count.percent, 25.0);
    Ok(())
}
