// SPDX-License-Identifier: MIT OR Apache-2.0
//! Round controller stop conditions, evaluated in a fixed priority order
//! every round (`spec.md` §4.1): an identity conflict is fatal and checked
//! first, then satisfaction, then budget exhaustion, then marginal yield,
//! then the hard round cap.

use serde::{Deserialize, Serialize};

/// Why the round controller stopped iterating on a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The identity gate reported an unresolvable conflict; the run aborts
    /// without publishing non-identity fields.
    IdentityConflictFatal,
    /// The quality gate's completeness and confidence targets are both met.
    Satisfied,
    /// Product or monthly LLM budget was exhausted before satisfaction.
    BudgetExhausted,
    /// Two consecutive rounds filled no new required fields and moved
    /// confidence by less than the marginal-yield threshold.
    MarginalYield,
    /// The configured round cap was reached.
    MaxRoundsReached,
}

impl StopReason {
    /// Stable lowercase token, matching `spec.md` §4.1's `stop_reason` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdentityConflictFatal => "identity_conflict_fatal",
            Self::Satisfied => "satisfied",
            Self::BudgetExhausted => "budget_exhausted",
            Self::MarginalYield => "marginal_yield",
            Self::MaxRoundsReached => "max_rounds_reached",
        }
    }

    /// `true` when the product run should be treated as validated output
    /// rather than a partial or aborted one.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// Everything [`evaluate_stop`] needs to decide whether to keep iterating.
#[derive(Debug, Clone, Copy)]
pub struct StopCheckInputs {
    /// `true` once the identity gate reports `IdentityConflict`.
    pub identity_conflict: bool,
    /// `true` once the quality gate's completeness/confidence targets are met.
    pub quality_satisfied: bool,
    /// `true` once the product or monthly budget guard has blocked an
    /// essential call, or the configured cost ceiling for this product is
    /// spent.
    pub budget_exhausted: bool,
    /// `true` once two consecutive rounds both met the marginal-yield rule.
    pub marginal_yield: bool,
    /// Round about to be attempted (0-indexed).
    pub next_round: u32,
    /// Maximum number of rounds configured for this category.
    pub max_rounds: u32,
}

/// Evaluate the round controller's stop conditions in priority order.
///
/// Returns `None` when the controller should run another round.
#[must_use]
pub fn evaluate_stop(inputs: &StopCheckInputs) -> Option<StopReason> {
    if inputs.identity_conflict {
        return Some(StopReason::IdentityConflictFatal);
    }
    if inputs.quality_satisfied {
        return Some(StopReason::Satisfied);
    }
    if inputs.budget_exhausted {
        return Some(StopReason::BudgetExhausted);
    }
    if inputs.marginal_yield {
        return Some(StopReason::MarginalYield);
    }
    if inputs.next_round >= inputs.max_rounds {
        return Some(StopReason::MaxRoundsReached);
    }
    None
}
