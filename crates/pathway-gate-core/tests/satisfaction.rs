// crates/pathway-gate-core/tests/satisfaction.rs
// ============================================================================
// Module: Satisfaction Evaluator Tests
// Description: Group rules, AND across groups, and deleted prerequisites.
// Purpose: Ensure unlock decisions follow the binary completion rules exactly.
// Dependencies: pathway-gate-core
// ============================================================================
//! ## Overview
//! Evaluates unlock state for `all_of`, `any_of`, and `n_of_m` groups against
//! participant snapshots, including partial progress and stale references.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

use pathway_gate_core::Activity;
use pathway_gate_core::ActivityCompletionState;
use pathway_gate_core::ActivityId;
use pathway_gate_core::ActivityPrerequisites;
use pathway_gate_core::CompletionSnapshot;
use pathway_gate_core::EngineError;
use pathway_gate_core::GraphLimits;
use pathway_gate_core::PathwayDefinition;
use pathway_gate_core::PathwayGraph;
use pathway_gate_core::PrereqRule;
use pathway_gate_core::PrerequisiteGroup;
use pathway_gate_core::SatisfactionEvaluator;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads pathway `p1` with activities `a`..`e` and the given prerequisites.
fn graph(prerequisites: Vec<ActivityPrerequisites>) -> PathwayGraph {
    let definition = PathwayDefinition::new(
        "p1",
        ["a", "b", "c", "d", "e"].into_iter().map(|id| Activity::new("p1", id)).collect(),
    )
    .with_prerequisites(prerequisites);
    PathwayGraph::from_definition(definition, &GraphLimits::default()).expect("load graph")
}

/// Builds a snapshot marking the listed activities complete.
fn completed(ids: &[&str]) -> CompletionSnapshot {
    ids.iter().map(|id| (*id, ActivityCompletionState::complete())).collect()
}

/// Shorthand for an activity id.
fn id(value: &str) -> ActivityId {
    ActivityId::from(value)
}

// ============================================================================
// SECTION: Group Rules
// ============================================================================

#[test]
fn n_of_m_matches_count_threshold_for_all_combinations() {
    let graph = graph(vec![ActivityPrerequisites::new(
        "d",
        vec![PrerequisiteGroup::n_of_m(2, ["a", "b", "c"])],
    )]);
    let evaluator = SatisfactionEvaluator::new(&graph);

    for mask in 0u8 .. 8 {
        let mut snapshot = CompletionSnapshot::new();
        let mut count = 0;
        for (bit, item) in ["a", "b", "c"].into_iter().enumerate() {
            if mask & (1 << bit) != 0 {
                snapshot.insert(item, ActivityCompletionState::complete());
                count += 1;
            } else {
                snapshot.insert(item, ActivityCompletionState::in_progress(50.0));
            }
        }
        let unlocked = evaluator.is_unlocked(&id("d"), &snapshot).expect("evaluate");
        assert_eq!(unlocked, count >= 2, "mask {mask:03b}");
    }
}

#[test]
fn all_of_requires_every_item() {
    let graph = graph(vec![ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["a", "b"])])]);
    let evaluator = SatisfactionEvaluator::new(&graph);

    assert!(!evaluator.is_unlocked(&id("c"), &completed(&["a"])).expect("evaluate"));
    assert!(evaluator.is_unlocked(&id("c"), &completed(&["a", "b"])).expect("evaluate"));
}

#[test]
fn any_of_requires_one_item() {
    let graph = graph(vec![ActivityPrerequisites::new("c", vec![PrerequisiteGroup::any_of(["a", "b"])])]);
    let evaluator = SatisfactionEvaluator::new(&graph);

    assert!(!evaluator.is_unlocked(&id("c"), &CompletionSnapshot::new()).expect("evaluate"));
    assert!(evaluator.is_unlocked(&id("c"), &completed(&["b"])).expect("evaluate"));
}

#[test]
fn activity_without_groups_is_unlocked() {
    let graph = graph(Vec::new());
    let evaluator = SatisfactionEvaluator::new(&graph);

    assert!(evaluator.is_unlocked(&id("a"), &CompletionSnapshot::new()).expect("evaluate"));
}

#[test]
fn groups_combine_with_and() {
    let graph = graph(vec![ActivityPrerequisites::new(
        "e",
        vec![PrerequisiteGroup::all_of(["a", "b"]), PrerequisiteGroup::any_of(["c", "d"])],
    )]);
    let evaluator = SatisfactionEvaluator::new(&graph);

    assert!(!evaluator.is_unlocked(&id("e"), &completed(&["a", "b"])).expect("evaluate"));
    assert!(evaluator.is_unlocked(&id("e"), &completed(&["a", "b", "d"])).expect("evaluate"));
}

// ============================================================================
// SECTION: Completion Policy
// ============================================================================

#[test]
fn partial_progress_never_counts() {
    let graph = graph(vec![ActivityPrerequisites::new("b", vec![PrerequisiteGroup::all_of(["a"])])]);
    let snapshot = CompletionSnapshot::new().with("a", ActivityCompletionState::in_progress(99.9));

    let unlocked = SatisfactionEvaluator::new(&graph).is_unlocked(&id("b"), &snapshot).expect("evaluate");

    assert!(!unlocked);
}

#[test]
fn deleted_prerequisite_is_never_done() {
    let graph = graph(vec![
        ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["a", "removed"])]),
        ActivityPrerequisites::new("d", vec![PrerequisiteGroup::any_of(["a", "removed"])]),
    ]);
    let evaluator = SatisfactionEvaluator::new(&graph);
    let stale = completed(&["a", "removed"]);

    assert!(!evaluator.is_unlocked(&id("c"), &stale).expect("evaluate"));
    assert!(evaluator.is_unlocked(&id("d"), &stale).expect("evaluate"));
}

#[test]
fn unknown_gated_activity_is_an_error() {
    let graph = graph(Vec::new());
    let err = SatisfactionEvaluator::new(&graph)
        .is_unlocked(&id("zz"), &CompletionSnapshot::new())
        .unwrap_err();

    assert!(matches!(err, EngineError::UnknownActivity { activity_id, .. } if activity_id == id("zz")));
}

// ============================================================================
// SECTION: Reports
// ============================================================================

#[test]
fn explain_lists_every_group_and_pending_items() {
    let graph = graph(vec![ActivityPrerequisites::new(
        "e",
        vec![PrerequisiteGroup::all_of(["a", "b"]), PrerequisiteGroup::n_of_m(2, ["b", "c", "d"])],
    )]);
    let snapshot = completed(&["a", "c"]);

    let report = SatisfactionEvaluator::new(&graph).explain(&id("e"), &snapshot).expect("explain");

    assert!(!report.unlocked);
    assert_eq!(report.groups.len(), 2);
    let first = &report.groups[0];
    assert_eq!(first.rule, PrereqRule::AllOf);
    assert_eq!((first.completed, first.required, first.satisfied), (1, 2, false));
    assert_eq!(first.pending, vec![id("b")]);
    let second = &report.groups[1];
    assert_eq!(second.group_index, 1);
    assert_eq!((second.completed, second.required, second.satisfied), (1, 2, false));
    assert_eq!(second.pending, vec![id("b"), id("d")]);
}

#[test]
fn unlocked_activities_walks_the_whole_pathway() {
    let graph = graph(vec![
        ActivityPrerequisites::new("b", vec![PrerequisiteGroup::all_of(["a"])]),
        ActivityPrerequisites::new("c", vec![PrerequisiteGroup::all_of(["b"])]),
    ]);

    let unlocked = SatisfactionEvaluator::new(&graph).unlocked_activities(&completed(&["a"]));

    assert_eq!(unlocked, vec![id("a"), id("b"), id("d"), id("e")]);
}
