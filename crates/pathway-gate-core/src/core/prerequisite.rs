// crates/pathway-gate-core/src/core/prerequisite.rs
// ============================================================================
// Module: Pathway Gate Prerequisite Groups
// Description: Prerequisite rules, groups, and per-activity group sets.
// Purpose: Model AND-combined requirement blocks over other activities.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A gated activity carries zero or more [`PrerequisiteGroup`]s, combined with
//! logical AND. Each group is satisfied by one closed [`PrereqRule`]:
//! every item, any item, or at least `n_required` items. The rule is a tagged
//! variant so `n_required` exists only on `n_of_m` groups.
//!
//! Wire form:
//! `{"prereq_type": "n_of_m", "n_required": 2, "items": ["a", "b", "c"]}`
//!
//! Groups decode through a raw shape so `n_required` is accepted only on
//! `n_of_m` groups and is mandatory there.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::ActivityId;

// ============================================================================
// SECTION: Prerequisite Rule
// ============================================================================

/// Satisfaction rule for a single prerequisite group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "prereq_type", rename_all = "snake_case")]
pub enum PrereqRule {
    /// Every item must be complete.
    AllOf,
    /// At least one item must be complete.
    AnyOf,
    /// At least `n_required` items must be complete.
    #[serde(rename = "n_of_m")]
    NOfM {
        /// Minimum number of complete items (`1 <= n_required <= items`).
        n_required: usize,
    },
}

impl PrereqRule {
    /// Returns how many complete items a group of `item_count` needs.
    #[must_use]
    pub const fn required_count(self, item_count: usize) -> usize {
        match self {
            Self::AllOf => item_count,
            Self::AnyOf => 1,
            Self::NOfM {
                n_required,
            } => n_required,
        }
    }
}

// ============================================================================
// SECTION: Prerequisite Group
// ============================================================================

/// One AND-ed requirement block attached to a gated activity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPrerequisiteGroup")]
pub struct PrerequisiteGroup {
    /// Satisfaction rule.
    #[serde(flatten)]
    pub rule: PrereqRule,
    /// Prerequisite activity identifiers.
    pub items: Vec<ActivityId>,
}

impl PrerequisiteGroup {
    /// Creates a group satisfied when every item is complete.
    #[must_use]
    pub fn all_of<I, A>(items: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActivityId>,
    {
        Self {
            rule: PrereqRule::AllOf,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a group satisfied when any item is complete.
    #[must_use]
    pub fn any_of<I, A>(items: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActivityId>,
    {
        Self {
            rule: PrereqRule::AnyOf,
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a group satisfied when at least `n_required` items are complete.
    #[must_use]
    pub fn n_of_m<I, A>(n_required: usize, items: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActivityId>,
    {
        Self {
            rule: PrereqRule::NOfM {
                n_required,
            },
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the number of complete items this group needs.
    #[must_use]
    pub const fn required_count(&self) -> usize {
        self.rule.required_count(self.items.len())
    }
}

// ============================================================================
// SECTION: Wire Decoding
// ============================================================================

/// Errors raised when a prerequisite group payload has the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupShapeError {
    /// `n_required` was supplied on a rule that does not take it.
    #[error("n_required is only allowed on n_of_m groups, found on {prereq_type}")]
    UnexpectedNRequired {
        /// Rule tag that carried the stray field.
        prereq_type: &'static str,
    },
    /// An `n_of_m` group omitted `n_required`.
    #[error("n_of_m groups require n_required")]
    MissingNRequired,
}

/// Rule tag as it appears on the wire.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawPrereqType {
    /// `all_of` tag.
    AllOf,
    /// `any_of` tag.
    AnyOf,
    /// `n_of_m` tag.
    #[serde(rename = "n_of_m")]
    NOfM,
}

/// Prerequisite group before the rule and `n_required` are reconciled.
#[derive(Debug, Deserialize)]
struct RawPrerequisiteGroup {
    /// Rule tag.
    prereq_type: RawPrereqType,
    /// Threshold for `n_of_m` groups.
    #[serde(default)]
    n_required: Option<usize>,
    /// Prerequisite activity identifiers.
    items: Vec<ActivityId>,
}

impl TryFrom<RawPrerequisiteGroup> for PrerequisiteGroup {
    type Error = GroupShapeError;

    fn try_from(raw: RawPrerequisiteGroup) -> Result<Self, Self::Error> {
        let rule = match (raw.prereq_type, raw.n_required) {
            (RawPrereqType::AllOf, None) => PrereqRule::AllOf,
            (RawPrereqType::AnyOf, None) => PrereqRule::AnyOf,
            (RawPrereqType::NOfM, Some(n_required)) => PrereqRule::NOfM {
                n_required,
            },
            (RawPrereqType::AllOf, Some(_)) => {
                return Err(GroupShapeError::UnexpectedNRequired {
                    prereq_type: "all_of",
                });
            }
            (RawPrereqType::AnyOf, Some(_)) => {
                return Err(GroupShapeError::UnexpectedNRequired {
                    prereq_type: "any_of",
                });
            }
            (RawPrereqType::NOfM, None) => return Err(GroupShapeError::MissingNRequired),
        };
        Ok(Self {
            rule,
            items: raw.items,
        })
    }
}

// ============================================================================
// SECTION: Activity Prerequisites
// ============================================================================

/// The full prerequisite group set for one gated activity.
///
/// Used both in pathway snapshots and as a proposed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityPrerequisites {
    /// Gated activity identifier.
    pub activity_id: ActivityId,
    /// Groups combined with logical AND.
    #[serde(default)]
    pub groups: Vec<PrerequisiteGroup>,
}

impl ActivityPrerequisites {
    /// Creates a prerequisite set for a gated activity.
    #[must_use]
    pub fn new(activity_id: impl Into<ActivityId>, groups: Vec<PrerequisiteGroup>) -> Self {
        Self {
            activity_id: activity_id.into(),
            groups,
        }
    }
}
