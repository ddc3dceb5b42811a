// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Per-field candidate clustering, scoring, and winner selection
//! (`spec.md` §4.6).
//!
//! [`evaluate_field`] takes every candidate extracted for one field across
//! all sources and produces the field's [`Provenance`] for the round:
//! filter out identity-gate failures, closed-enum violations, and anchor
//! conflicts; cluster survivors by normalized value; score each cluster by
//! method/tier weight and plausibility; pick a winner per the field's
//! [`ConflictPolicy`]; and compute the field's aggregate confidence.

mod constraints;
mod normalize;
mod rule;

pub use constraints::{apply_constraints, ConstraintKind, CrossFieldConstraint};
pub use normalize::{cluster_key, extract_numeric, normalize_value};
pub use rule::{ConflictPolicy, FieldRule};

use specfactory_types::{Anchors, Candidate, EvidenceRow, FieldReasoning, FieldValue, Provenance, Source, Tier};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// One group of candidates whose values were judged equivalent.
#[derive(Debug, Clone)]
struct Cluster {
    key: String,
    members: Vec<Candidate>,
    score: f64,
}

impl Cluster {
    fn representative_value(&self) -> &str {
        &self.members[0].value
    }

    fn has_tier(&self, sources: &BTreeMap<String, Source>, tier: Tier) -> bool {
        self.members
            .iter()
            .any(|c| sources.get(&c.source_id).is_some_and(|s| s.tier == tier))
    }

    fn tier_count(&self, sources: &BTreeMap<String, Source>) -> usize {
        self.members
            .iter()
            .filter_map(|c| sources.get(&c.source_id).map(|s| s.tier))
            .collect::<BTreeSet<_>>()
            .len()
    }

    fn distinct_evidence_refs(&self) -> usize {
        self.members
            .iter()
            .flat_map(|c| c.evidence_refs.iter())
            .collect::<HashSet<_>>()
            .len()
    }

    fn approved_source_count(&self, sources: &BTreeMap<String, Source>, approved_domains: &HashSet<String>) -> usize {
        self.members
            .iter()
            .filter_map(|c| sources.get(&c.source_id))
            .filter(|s| approved_domains.contains(&s.host) || approved_domains.contains(&s.root_domain))
            .map(|s| s.source_id.clone())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Method weight used in cluster scoring: the candidate's own confidence
/// base (`spec.md` §4.4 bases, §4.6 step 3).
fn method_weight(candidate: &Candidate) -> f64 {
    candidate.confidence_base
}

/// Plausibility adjustment for a cluster's representative value
/// (`spec.md` §4.6 step 3: "±2... −4 to −6 outside").
fn plausibility_boost(value: &str, range: Option<(f64, f64)>) -> f64 {
    let Some((lo, hi)) = range else { return 0.0 };
    match extract_numeric(value) {
        Some(n) if n >= lo && n <= hi => 2.0,
        Some(n) => {
            let span = (hi - lo).max(1.0);
            let overshoot = if n < lo { lo - n } else { n - hi } / span;
            if overshoot > 1.0 {
                -6.0
            } else {
                -4.0
            }
        }
        None => 0.0,
    }
}

fn score_cluster(cluster: &Cluster, sources: &BTreeMap<String, Source>, range: Option<(f64, f64)>) -> f64 {
    cluster
        .members
        .iter()
        .map(|c| {
            let tier_weight = sources.get(&c.source_id).map_or(0.5, |s| s.tier.weight());
            method_weight(c) * tier_weight + plausibility_boost(&c.value, range)
        })
        .sum()
}

/// Why a candidate was excluded before clustering (`spec.md` §4.6 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DropReason {
    UnknownValue,
    IdentityGateFailed,
    EnumValueNotAllowed,
    AnchorConflict,
}

impl DropReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::UnknownValue => "unknown_value",
            Self::IdentityGateFailed => "identity_gate_failed",
            Self::EnumValueNotAllowed => "enum_value_not_allowed",
            Self::AnchorConflict => "anchor_conflict",
        }
    }
}

fn filter_candidates(
    candidates: &[Candidate],
    rule: &FieldRule,
    identity_matched_sources: &HashSet<String>,
    anchors: &Anchors,
) -> (Vec<Candidate>, Vec<DropReason>) {
    let mut kept = Vec::new();
    let mut drop_reasons = Vec::new();

    let anchor_expected = anchors.get(&rule.field).map(|v| normalize_value(v));

    for candidate in candidates {
        if FieldValue::is_unknown_token(&normalize_value(&candidate.value)) {
            drop_reasons.push(DropReason::UnknownValue);
            continue;
        }
        if !identity_matched_sources.is_empty() && !identity_matched_sources.contains(&candidate.source_id) {
            drop_reasons.push(DropReason::IdentityGateFailed);
            continue;
        }
        if let Some(allowed) = &rule.allowed_values {
            let normalized = normalize_value(&candidate.value);
            if !allowed.iter().any(|v| normalize_value(v) == normalized) {
                drop_reasons.push(DropReason::EnumValueNotAllowed);
                continue;
            }
        }
        if let Some(expected) = &anchor_expected
            && normalize_value(&candidate.value) != *expected
        {
            drop_reasons.push(DropReason::AnchorConflict);
            continue;
        }
        kept.push(candidate.clone());
    }

    (kept, drop_reasons)
}

fn cluster_candidates(candidates: Vec<Candidate>, rule: &FieldRule, sources: &BTreeMap<String, Source>) -> Vec<Cluster> {
    let mut by_key: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        let key = cluster_key(&candidate.value, rule.numeric_tolerance_pct);
        by_key.entry(key).or_default().push(candidate);
    }
    by_key
        .into_iter()
        .map(|(key, members)| {
            let cluster = Cluster { key, members, score: 0.0 };
            let score = score_cluster(&cluster, sources, rule.plausibility_range);
            Cluster { score, ..cluster }
        })
        .collect()
}

/// Rank clusters for winner selection: highest score first, ties broken by
/// `(higher tier count, lab-instrumented present, more confirmations)`
/// (`spec.md` §4.6 step 4).
fn rank_clusters<'a>(clusters: &'a [Cluster], sources: &BTreeMap<String, Source>) -> Vec<&'a Cluster> {
    let mut ranked: Vec<&Cluster> = clusters.iter().collect();
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.tier_count(sources).cmp(&a.tier_count(sources)))
            .then_with(|| b.has_tier(sources, Tier::LabDatabase).cmp(&a.has_tier(sources, Tier::LabDatabase)))
            .then_with(|| b.members.len().cmp(&a.members.len()))
    });
    ranked
}

/// Produce one field's [`Provenance`] for the current round.
///
/// `identity_matched_sources` lists source IDs whose per-source identity
/// score cleared the per-tier threshold (`specfactory_gates`); an empty set
/// disables the identity filter (used when the identity gate itself is not
/// yet locked for this round). `approved_domains` names hosts/root-domains
/// on the category allowlist, used to count `approved_confirmations`.
#[must_use]
pub fn evaluate_field(
    rule: &FieldRule,
    candidates: &[Candidate],
    sources: &BTreeMap<String, Source>,
    approved_domains: &HashSet<String>,
    identity_matched_sources: &HashSet<String>,
    anchors: &Anchors,
    identity_confidence: f64,
) -> Provenance {
    let (filtered, drop_reasons) = filter_candidates(candidates, rule, identity_matched_sources, anchors);
    let anchor_conflicts = drop_reasons.iter().filter(|r| **r == DropReason::AnchorConflict).count();

    let mut reasoning = FieldReasoning::default();
    for reason in drop_reasons.iter().collect::<HashSet<_>>() {
        reasoning.reasons.push(reason.as_str().to_string());
    }

    if filtered.is_empty() {
        let reason = if reasoning.reasons.is_empty() { "missing".to_string() } else { reasoning.reasons[0].clone() };
        return Provenance::new(FieldValue::unk(reason), 0, 0, rule.pass_target(), 0.0, vec![], reasoning);
    }

    let total_filtered = filtered.len();
    let clusters = cluster_candidates(filtered, rule, sources);
    let ranked = rank_clusters(&clusters, sources);

    let winner = match rule.conflict_policy {
        ConflictPolicy::MajorityVote => ranked
            .iter()
            .max_by_key(|c| c.approved_source_count(sources, approved_domains))
            .copied()
            .unwrap_or(ranked[0]),
        _ => ranked[0],
    };

    if rule.conflict_policy == ConflictPolicy::ResolveByTierElseUnknown
        && ranked.len() > 1
        && ranked[0].score != ranked[1].score
        && ranked[0].has_tier(sources, Tier::Manufacturer)
        && ranked[1].has_tier(sources, Tier::Manufacturer)
    {
        reasoning.reasons.push("conflicting_sources_unresolved".to_string());
        return Provenance::new(
            FieldValue::unk("conflicting_sources_unresolved"),
            total_filtered as u32,
            0,
            rule.pass_target(),
            0.0,
            vec![],
            reasoning,
        );
    }

    if rule.conflict_policy == ConflictPolicy::PreserveAllCandidates && ranked.len() > 1 {
        reasoning.reasons.push("conflict_policy_hold".to_string());
    }

    let confirmations = winner.members.len() as u32;
    let approved_confirmations = winner.approved_source_count(sources, approved_domains) as u32;
    let pass_target = rule.pass_target();

    if rule.min_evidence_refs_effective >= 2 && (winner.distinct_evidence_refs() as u32) < rule.min_evidence_refs_effective {
        reasoning.reasons.push("below_min_evidence".to_string());
        return Provenance::new(
            FieldValue::unk("below_min_evidence"),
            confirmations,
            approved_confirmations,
            pass_target,
            0.0,
            vec![],
            reasoning,
        );
    }

    let mean_confidence_base =
        winner.members.iter().map(|c| c.confidence_base).sum::<f64>() / winner.members.len() as f64;
    let agreement_score = winner.members.len() as f64 / total_filtered as f64;
    let confidence = (0.5 * identity_confidence + 0.35 * mean_confidence_base + 0.15 * agreement_score
        - (0.06 * anchor_conflicts as f64).min(0.4))
    .clamp(0.0, 1.0);

    let mut evidence: Vec<EvidenceRow> = winner
        .members
        .iter()
        .filter_map(|c| {
            sources.get(&c.source_id).map(|s| EvidenceRow {
                url: s.url.clone(),
                host: s.host.clone(),
                root_domain: s.root_domain.clone(),
                tier: s.tier,
                method: c.method.as_str().to_string(),
                key_path: c.key_path.clone(),
            })
        })
        .collect();
    evidence.sort_by_key(|e| e.tier);

    Provenance::new(
        FieldValue::Scalar { value: winner.representative_value().to_string() },
        confirmations,
        approved_confirmations,
        pass_target,
        confidence,
        evidence,
        reasoning,
    )
}
