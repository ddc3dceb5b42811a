// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-source identity signals and their weighted combination into a score.
//!
//! `spec.md` §4.7: "combine: brand-token match in title/URL/JSON-LD,
//! model-token match, variant-token match (when locked), SKU/MPN/GTIN match,
//! and anchor-field agreement. Score ∈ [0, 1]".

use specfactory_types::Tier;

const BRAND_WEIGHT: f64 = 0.30;
const MODEL_WEIGHT: f64 = 0.30;
const VARIANT_OR_SKU_WEIGHT: f64 = 0.25;
const ANCHOR_WEIGHT: f64 = 0.15;

/// Raw per-source identity signals feeding [`IdentitySignal::score`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentitySignal {
    /// Brand token matched in the source's title, URL, or JSON-LD.
    pub brand_match: bool,
    /// Model token matched.
    pub model_match: bool,
    /// Variant token matched (only meaningful when the job locks a variant).
    pub variant_match: bool,
    /// SKU, MPN, or GTIN matched.
    pub sku_match: bool,
    /// Fraction of the job's locked anchors this source agrees with, `[0, 1]`.
    pub anchor_agreement: f64,
}

impl IdentitySignal {
    /// Weighted combination of the signals into a score in `[0, 1]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        let mut score = 0.0;
        if self.brand_match {
            score += BRAND_WEIGHT;
        }
        if self.model_match {
            score += MODEL_WEIGHT;
        }
        if self.variant_match || self.sku_match {
            score += VARIANT_OR_SKU_WEIGHT;
        }
        score += ANCHOR_WEIGHT * self.anchor_agreement.clamp(0.0, 1.0);
        score
    }
}

/// One source's identity score, scoped to its authority tier (the tier sets
/// the match threshold via [`Tier::identity_match_threshold`]).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceIdentityScore {
    /// The source this score describes.
    pub source_id: String,
    /// Authority tier, which sets the match threshold.
    pub tier: Tier,
    /// Raw signals the score was derived from.
    pub signal: IdentitySignal,
}

impl SourceIdentityScore {
    /// Combined score in `[0, 1]`.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.signal.score()
    }

    /// `true` iff this source's score clears its tier's identity threshold.
    #[must_use]
    pub fn matches(&self) -> bool {
        self.score() >= self.tier.identity_match_threshold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_signal_scores_one() {
        let signal = IdentitySignal {
            brand_match: true,
            model_match: true,
            variant_match: true,
            sku_match: false,
            anchor_agreement: 1.0,
        };
        assert!((signal.score() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn variant_and_sku_do_not_double_count() {
        let signal = IdentitySignal {
            brand_match: true,
            model_match: true,
            variant_match: true,
            sku_match: true,
            anchor_agreement: 0.0,
        };
        assert!((signal.score() - 0.90).abs() < 1e-9);
    }

    #[test]
    fn manufacturer_tier_has_lower_threshold_than_candidate_tier() {
        let signal = IdentitySignal {
            brand_match: true,
            model_match: true,
            variant_match: false,
            sku_match: false,
            anchor_agreement: 0.0,
        };
        let manufacturer = SourceIdentityScore {
            source_id: "s1".into(),
            tier: Tier::Manufacturer,
            signal,
        };
        let candidate = SourceIdentityScore {
            source_id: "s2".into(),
            tier: Tier::Candidate,
            signal,
        };
        assert!(manufacturer.matches());
        assert!(!candidate.matches());
    }
}
