//! Provenance — the per-field, per-product outcome of consensus.
//!
//! See `spec.md` §3.5.

use crate::source::Tier;
use crate::value::FieldValue;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One evidence row backing a field's resolved value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceRow {
    /// Page URL.
    pub url: String,
    /// Host.
    pub host: String,
    /// eTLD+1 root domain.
    pub root_domain: String,
    /// Source tier.
    pub tier: Tier,
    /// Extraction method.
    pub method: String,
    /// Structural path within the source.
    pub key_path: String,
}

/// Reason codes attached to a field's final state, surfaced to the summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FieldReasoning {
    /// Reason codes accumulated while resolving this field (e.g.
    /// `below_min_evidence`, `conflicting_sources_unresolved`).
    pub reasons: Vec<String>,
}

/// Per-field, per-product consensus outcome.
///
/// Invariant (`spec.md` §3.5): `approved_confirmations <= confirmations`;
/// `meets_pass_target` is true iff `approved_confirmations >= pass_target`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Provenance {
    /// Resolved value.
    pub value: FieldValue,
    /// Total candidates (any source) agreeing with the winning cluster.
    pub confirmations: u32,
    /// Candidates from approved-domain sources agreeing with the winner.
    pub approved_confirmations: u32,
    /// Confirmations required for this field to count as met.
    pub pass_target: u32,
    /// `approved_confirmations >= pass_target`.
    pub meets_pass_target: bool,
    /// Aggregate confidence score in `[0, 1]`.
    pub confidence: f64,
    /// Supporting evidence rows, tier-1 first.
    pub evidence: Vec<EvidenceRow>,
    /// Accumulated reasoning for audit/debugging.
    #[serde(default)]
    pub reasoning: FieldReasoning,
}

impl Provenance {
    /// Construct provenance and assert the invariants `spec.md` §3.5 and §8
    /// require, panicking in debug builds on violation (a construction bug,
    /// not a runtime condition).
    #[must_use]
    pub fn new(
        value: FieldValue,
        confirmations: u32,
        approved_confirmations: u32,
        pass_target: u32,
        confidence: f64,
        evidence: Vec<EvidenceRow>,
        reasoning: FieldReasoning,
    ) -> Self {
        debug_assert!(approved_confirmations <= confirmations);
        let meets_pass_target = approved_confirmations >= pass_target;
        Self {
            value,
            confirmations,
            approved_confirmations,
            pass_target,
            meets_pass_target,
            confidence,
            evidence,
            reasoning,
        }
    }

    /// `spec.md` §8 invariant: for every field with `value != unk`,
    /// `provenance.evidence` must be non-empty.
    #[must_use]
    pub fn satisfies_evidence_invariant(&self) -> bool {
        !self.value.is_known() || !self.evidence.is_empty()
    }
}
