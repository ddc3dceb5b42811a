//! Needset — per-round derivation of which fields still need work.
//!
//! See `spec.md` §3.6 and §4.10.

use crate::source::Tier;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Field's historic fill-rate class; drives effort allocation and
/// unknown-reason labeling (`spec.md` GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityClass {
    /// Present in nearly every source for this category.
    Expected,
    /// Present in some sources; absence is not conclusive.
    Sometimes,
    /// Rarely published; absence after modest effort is expected.
    Rare,
}

/// Why a field is still in the needset this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeficitReason {
    /// No candidate has been observed yet.
    Missing,
    /// A value exists but has fewer confirmations than `pass_target`.
    BelowPassTarget,
    /// Winning cluster has fewer evidence refs than required.
    BelowMinEvidence,
    /// Top clusters disagree and neither dominates.
    ConflictingSources,
    /// A cross-field constraint was violated.
    ConstraintViolation,
}

/// One row of the per-round needset: a field still requiring work, and why.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NeedsetRow {
    /// Field name.
    pub field: String,
    /// `"required"` / `"expected"` / instrumented-only, from the field rule.
    pub required_level: String,
    /// Historic fill-rate class.
    pub availability_class: AvailabilityClass,
    /// Why this field still needs work.
    pub deficit_reason: DeficitReason,
    /// Source tiers to prioritize next round, in preference order.
    pub tier_preference: Vec<Tier>,
    /// Minimum distinct evidence refs required to resolve this field.
    pub min_evidence_refs: u32,
    /// `true` if the next round should use the high-tier model ladder for
    /// this field regardless of round-level policy.
    pub force_high: bool,
}
