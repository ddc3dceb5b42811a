// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-source identity scoring heuristic (`spec.md` §4.7): turns a fetched
//! [`Source`] plus its extracted [`Candidate`]s into the
//! [`SourceIdentityScore`] the round controller feeds to
//! `specfactory_gates::evaluate_identity_gate`.
//!
//! This is deliberately separate from `specfactory_extract::identity`, which
//! clusters *multi-product pages* into per-cluster tags before extraction
//! runs. This module scores a *source as a whole* after extraction, for the
//! identity gate that decides whether a run may keep publishing fields.

use specfactory_gates::{IdentitySignal, SourceIdentityScore};
use specfactory_types::{Anchors, Candidate, IdentityLock, Source};

/// Case-insensitive substring match of `needle` against `haystack`, `false`
/// for an empty needle (nothing to match against).
fn token_present(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Text a brand/model/variant/sku token is checked against: the source's
/// URL plus every candidate value extracted from it. Title and JSON-LD text
/// are folded into candidate values upstream by the extraction pipeline, so
/// scanning candidate values covers `spec.md` §4.7's "title/URL/JSON-LD"
/// wording without re-parsing the page here.
fn searchable_text<'a>(source: &'a Source, candidates: &'a [Candidate]) -> Vec<&'a str> {
    let mut text = vec![source.url.as_str(), source.final_url.as_str()];
    text.extend(candidates.iter().map(|c| c.value.as_str()));
    text
}

/// Fraction of `anchors` this source's candidates agree with: for each
/// anchored field with at least one candidate, the source agrees if any of
/// its candidate values for that field case-insensitively matches the
/// anchor value. Fields the source has no candidate for are excluded from
/// the denominator rather than counted as disagreement, since silence is
/// not evidence against an anchor.
fn anchor_agreement(candidates: &[Candidate], anchors: &Anchors) -> f64 {
    let mut considered = 0usize;
    let mut agreed = 0usize;
    for (field, expected) in anchors {
        let mut has_candidate = false;
        let mut matched = false;
        for candidate in candidates.iter().filter(|c| &c.field == field) {
            has_candidate = true;
            if candidate.value.trim().eq_ignore_ascii_case(expected.trim()) {
                matched = true;
            }
        }
        if has_candidate {
            considered += 1;
            if matched {
                agreed += 1;
            }
        }
    }
    if considered == 0 {
        return 0.0;
    }
    agreed as f64 / considered as f64
}

/// Score one source's identity agreement against a job's locked identity.
///
/// `candidates` should be every candidate extracted from `source` this run,
/// across all rounds so far — scoring improves as more evidence accumulates.
#[must_use]
pub fn score_source(
    source: &Source,
    candidates: &[Candidate],
    lock: &IdentityLock,
    anchors: &Anchors,
) -> SourceIdentityScore {
    let text = searchable_text(source, candidates);
    let brand_match = text.iter().any(|t| token_present(t, &lock.brand));
    let model_match = text.iter().any(|t| token_present(t, &lock.model));
    let variant_match = lock
        .variant
        .as_deref()
        .is_some_and(|variant| text.iter().any(|t| token_present(t, variant)));
    let sku_match = [lock.sku.as_deref(), lock.mpn.as_deref(), lock.gtin.as_deref()]
        .into_iter()
        .flatten()
        .any(|token| text.iter().any(|t| token_present(t, token)));

    let signal = IdentitySignal {
        brand_match,
        model_match,
        variant_match,
        sku_match,
        anchor_agreement: anchor_agreement(candidates, anchors),
    };

    SourceIdentityScore {
        source_id: source.source_id.clone(),
        tier: source.tier,
        signal,
    }
}
