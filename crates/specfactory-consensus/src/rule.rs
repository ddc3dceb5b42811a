// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-field consensus policy (`spec.md` §4.6).

use serde::{Deserialize, Serialize};

/// How a field resolves a tie or disagreement between its top clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Value becomes `unk` with `conflicting_sources_unresolved` when the
    /// top two clusters differ and both have tier-1 support.
    ResolveByTierElseUnknown,
    /// Auto-pick the top cluster but flag `conflict_policy_hold` for human
    /// review.
    PreserveAllCandidates,
    /// Winner is whichever cluster has the most approved-domain sources.
    MajorityVote,
}

/// Per-field consensus configuration resolved from the category rule store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldRule {
    /// Field this rule governs.
    pub field: String,
    /// `"required"` / `"expected"` / `"instrumented_only"`, drives the
    /// default `pass_target`.
    pub required_level: String,
    /// How to resolve top-cluster disagreement.
    pub conflict_policy: ConflictPolicy,
    /// Plausible numeric range; values outside are penalized
    /// (`spec.md` §4.6 step 3).
    pub plausibility_range: Option<(f64, f64)>,
    /// Relative tolerance for numeric clustering (e.g. `0.02` = 2%).
    pub numeric_tolerance_pct: Option<f64>,
    /// Minimum distinct evidence refs the winning cluster must carry.
    pub min_evidence_refs_effective: u32,
    /// Closed-enum allowed values; `None` means the field is open-ended.
    pub allowed_values: Option<Vec<String>>,
    /// Explicit pass-target override; falls back to the required-level
    /// default (`spec.md` §4.6 step 5) when unset.
    pub pass_target_override: Option<u32>,
}

impl FieldRule {
    /// Resolve the pass-target: the override if set, else the default for
    /// `required_level` (required=2, expected=1, instrumented_only=3).
    #[must_use]
    pub fn pass_target(&self) -> u32 {
        self.pass_target_override.unwrap_or(match self.required_level.as_str() {
            "required" => 2,
            "expected" => 1,
            "instrumented_only" => 3,
            _ => 2,
        })
    }

    /// A minimal rule with default policy, for fields without explicit
    /// category-level tuning.
    #[must_use]
    pub fn default_for(field: impl Into<String>, required_level: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required_level: required_level.into(),
            conflict_policy: ConflictPolicy::ResolveByTierElseUnknown,
            plausibility_range: None,
            numeric_tolerance_pct: None,
            min_evidence_refs_effective: 1,
            allowed_values: None,
            pass_target_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_target_defaults_by_required_level() {
        assert_eq!(FieldRule::default_for("weight", "required").pass_target(), 2);
        assert_eq!(FieldRule::default_for("color", "expected").pass_target(), 1);
        assert_eq!(
            FieldRule::default_for("latency_ms", "instrumented_only").pass_target(),
            3
        );
    }

    #[test]
    fn pass_target_override_wins() {
        let mut rule = FieldRule::default_for("weight", "required");
        rule.pass_target_override = Some(5);
        assert_eq!(rule.pass_target(), 5);
    }
}
