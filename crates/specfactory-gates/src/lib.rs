// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Identity gate and quality gate (`spec.md` §4.7, §4.8).
//!
//! The identity gate decides whether a product's locked identity is trusted
//! enough to publish non-identity fields; the quality gate decides whether
//! the final normalized record meets its completeness/confidence targets.

mod audit;
mod compose;
mod rules;

pub use audit::{GateAuditEntry, GateAuditor};
pub use compose::{evaluate_quality_gate, QualityGateReport, ValidationFailure};
pub use rules::{IdentitySignal, SourceIdentityScore};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use specfactory_types::IdentityLock;

/// `spec.md` §4.7 product-level gate decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum IdentityGateDecision {
    /// Brand+model+(variant or sku) all locked and `identity_confidence >= 0.99`.
    IdentityLockedFull,
    /// Brand+model only, `identity_confidence >= 0.70`.
    IdentityProvisional,
    /// Major anchor conflict, or `identity_confidence < 0.70`.
    IdentityConflict {
        /// Reason codes explaining the conflict.
        reasons: Vec<String>,
    },
    /// None of the above thresholds were met.
    IdentityUnlocked,
}

impl IdentityGateDecision {
    /// `true` for [`Self::IdentityLockedFull`].
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::IdentityLockedFull)
    }

    /// `true` when non-identity fields must be suppressed from publication.
    #[must_use]
    pub fn suppresses_non_identity_fields(&self) -> bool {
        matches!(self, Self::IdentityConflict { .. })
    }
}

/// Outcome of evaluating the identity gate for one product round.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityGateReport {
    /// The gate decision.
    pub decision: IdentityGateDecision,
    /// Weighted mean identity score of matching sources.
    pub identity_confidence: f64,
    /// `true` below the `0.99` full-confidence threshold — the run is
    /// marked `aborted_identity` per `spec.md` §4.7 even when the decision
    /// is not [`IdentityGateDecision::IdentityConflict`].
    pub aborted_identity: bool,
}

/// Evaluate the identity gate for one product round.
///
/// `identity_confidence` is the weighted mean of `sources` that individually
/// clear their tier's match threshold (`spec.md` §4.7), weighted by
/// [`specfactory_types::Tier::weight`].
#[must_use]
pub fn evaluate_identity_gate(
    lock: &IdentityLock,
    sources: &[SourceIdentityScore],
    anchor_conflict: bool,
) -> IdentityGateReport {
    let matching: Vec<&SourceIdentityScore> = sources.iter().filter(|s| s.matches()).collect();

    let identity_confidence = if matching.is_empty() {
        0.0
    } else {
        let weight_sum: f64 = matching.iter().map(|s| s.tier.weight()).sum();
        if weight_sum <= 0.0 {
            0.0
        } else {
            let weighted: f64 = matching.iter().map(|s| s.score() * s.tier.weight()).sum();
            weighted / weight_sum
        }
    };

    let mut reasons = Vec::new();
    if anchor_conflict {
        reasons.push("anchor_conflict".to_string());
    }
    if identity_confidence < 0.70 {
        reasons.push("identity_confidence_below_threshold".to_string());
    }

    let decision = if !reasons.is_empty() {
        IdentityGateDecision::IdentityConflict { reasons }
    } else if lock.has_full_lock() && identity_confidence >= 0.99 {
        IdentityGateDecision::IdentityLockedFull
    } else if !lock.brand.is_empty() && !lock.model.is_empty() && identity_confidence >= 0.70 {
        IdentityGateDecision::IdentityProvisional
    } else {
        IdentityGateDecision::IdentityUnlocked
    };

    IdentityGateReport {
        decision,
        identity_confidence,
        aborted_identity: identity_confidence < 0.99,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfactory_types::Tier;

    fn lock(full: bool) -> IdentityLock {
        IdentityLock {
            brand: "LogitechG".into(),
            model: "Pro X Superlight".into(),
            variant: full.then(|| "Superlight".to_string()),
            ..IdentityLock::default()
        }
    }

    fn strong_source(tier: Tier) -> SourceIdentityScore {
        SourceIdentityScore {
            source_id: "s1".into(),
            tier,
            signal: IdentitySignal {
                brand_match: true,
                model_match: true,
                variant_match: true,
                sku_match: false,
                anchor_agreement: 1.0,
            },
        }
    }

    #[test]
    fn full_lock_with_high_confidence_locks_full() {
        let report = evaluate_identity_gate(&lock(true), &[strong_source(Tier::Manufacturer)], false);
        assert_eq!(report.decision, IdentityGateDecision::IdentityLockedFull);
        assert!(!report.aborted_identity);
    }

    #[test]
    fn brand_model_only_without_full_lock_is_provisional() {
        let weak_signal = IdentitySignal {
            brand_match: true,
            model_match: true,
            variant_match: false,
            sku_match: false,
            anchor_agreement: 0.0,
        };
        let source = SourceIdentityScore {
            source_id: "s1".into(),
            tier: Tier::Manufacturer,
            signal: weak_signal,
        };
        let report = evaluate_identity_gate(&lock(false), &[source], false);
        assert_eq!(report.decision, IdentityGateDecision::IdentityProvisional);
        assert!(report.aborted_identity);
    }

    #[test]
    fn no_matching_sources_is_unlocked() {
        let report = evaluate_identity_gate(&IdentityLock::default(), &[], false);
        assert_eq!(report.decision, IdentityGateDecision::IdentityUnlocked);
    }

    #[test]
    fn anchor_conflict_forces_identity_conflict_even_with_high_confidence() {
        let report = evaluate_identity_gate(&lock(true), &[strong_source(Tier::Manufacturer)], true);
        assert!(matches!(report.decision, IdentityGateDecision::IdentityConflict { .. }));
    }

    #[test]
    fn suppresses_non_identity_fields_only_on_conflict() {
        let locked = evaluate_identity_gate(&lock(true), &[strong_source(Tier::Manufacturer)], false);
        assert!(!locked.decision.suppresses_non_identity_fields());
        let conflict = evaluate_identity_gate(&lock(true), &[strong_source(Tier::Manufacturer)], true);
        assert!(conflict.decision.suppresses_non_identity_fields());
    }
}
