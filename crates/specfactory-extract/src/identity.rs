// SPDX-License-Identifier: MIT OR Apache-2.0
//! Multi-product identity gate (`spec.md` §4.4 "Multi-product identity
//! gate"): tags candidates extracted from a catalog/comparison page with the
//! product cluster they belong to, and whether that cluster matches the
//! target product, so mismatched clusters can be dropped before consensus.

use specfactory_types::{Candidate, IdentityLock};

/// One candidate's multi-product identity tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityTag {
    /// Cluster this candidate's row/card belongs to on the page.
    pub page_product_cluster_id: String,
    /// How well the cluster matches the job's locked identity, in `[0, 1]`.
    pub target_match_score: f64,
    /// `true` once `target_match_score` clears [`TARGET_MATCH_THRESHOLD`].
    pub target_match_passed: bool,
}

/// One cluster of candidates on a catalog/comparison page, keyed by the
/// brand/model/sku tokens found near it (e.g. a product-card heading).
#[derive(Debug, Clone)]
pub struct PageProductCluster {
    /// Stable ID for this cluster within the page.
    pub cluster_id: String,
    /// Brand token detected near this cluster, if any.
    pub brand_token: Option<String>,
    /// Model token detected near this cluster, if any.
    pub model_token: Option<String>,
    /// SKU token detected near this cluster, if any.
    pub sku_token: Option<String>,
}

/// Minimum `target_match_score` for a cluster's candidates to survive onto
/// consensus (`spec.md` §4.4: `target_match_passed=false` candidates are
/// dropped, audit-only).
pub const TARGET_MATCH_THRESHOLD: f64 = 0.70;

fn token_matches(candidate: Option<&str>, target: Option<&str>) -> bool {
    match (candidate, target) {
        (Some(c), Some(t)) if !t.trim().is_empty() => c.trim().eq_ignore_ascii_case(t.trim()),
        _ => false,
    }
}

/// Score how well `cluster` matches the job's locked identity: brand 0.40,
/// model 0.40, sku 0.20, weighted token equality (case-insensitive).
#[must_use]
pub fn target_match_score(cluster: &PageProductCluster, lock: &IdentityLock) -> f64 {
    let mut score = 0.0;
    if token_matches(cluster.brand_token.as_deref(), Some(lock.brand.as_str())) {
        score += 0.40;
    }
    if token_matches(cluster.model_token.as_deref(), Some(lock.model.as_str())) {
        score += 0.40;
    }
    if token_matches(cluster.sku_token.as_deref(), lock.sku.as_deref()) {
        score += 0.20;
    }
    score
}

/// Tag every candidate in `candidates` with the cluster `cluster_of`
/// resolves it to, and whether that cluster passed the target-match
/// threshold. Candidates `cluster_of` maps to an unknown cluster id are
/// dropped from the result (page structure couldn't place them).
#[must_use]
pub fn tag_candidates<'a>(
    candidates: &'a [Candidate],
    clusters: &[PageProductCluster],
    lock: &IdentityLock,
    cluster_of: impl Fn(&Candidate) -> Option<&'a str>,
) -> Vec<(&'a Candidate, IdentityTag)> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let cluster_id = cluster_of(candidate)?;
            let cluster = clusters.iter().find(|cl| cl.cluster_id == cluster_id)?;
            let score = target_match_score(cluster, lock);
            Some((
                candidate,
                IdentityTag {
                    page_product_cluster_id: cluster_id.to_string(),
                    target_match_score: score,
                    target_match_passed: score >= TARGET_MATCH_THRESHOLD,
                },
            ))
        })
        .collect()
}

/// Drop every candidate whose tag failed the target-match threshold,
/// keeping the rest paired with their tag for audit purposes.
#[must_use]
pub fn drop_unmatched(tagged: Vec<(&Candidate, IdentityTag)>) -> Vec<(&Candidate, IdentityTag)> {
    tagged.into_iter().filter(|(_, tag)| tag.target_match_passed).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfactory_types::CandidateMethod;

    fn lock() -> IdentityLock {
        IdentityLock {
            brand: "Logitech".into(),
            model: "G Pro X Superlight".into(),
            variant: None,
            sku: Some("910-005940".into()),
            mpn: None,
            gtin: None,
        }
    }

    fn cluster(id: &str, brand: &str, model: &str) -> PageProductCluster {
        PageProductCluster {
            cluster_id: id.into(),
            brand_token: Some(brand.into()),
            model_token: Some(model.into()),
            sku_token: None,
        }
    }

    #[test]
    fn matching_brand_and_model_passes_threshold() {
        let score = target_match_score(&cluster("c1", "Logitech", "G Pro X Superlight"), &lock());
        assert!((score - 0.80).abs() < 1e-9);
        assert!(score >= TARGET_MATCH_THRESHOLD);
    }

    #[test]
    fn mismatched_model_fails_threshold() {
        let score = target_match_score(&cluster("c1", "Logitech", "G502"), &lock());
        assert!(score < TARGET_MATCH_THRESHOLD);
    }

    #[test]
    fn full_match_including_sku_scores_one() {
        let mut c = cluster("c1", "Logitech", "G Pro X Superlight");
        c.sku_token = Some("910-005940".into());
        assert!((target_match_score(&c, &lock()) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn drop_unmatched_removes_failed_clusters_only() {
        let c1 = Candidate::new("weight", "63 g", CandidateMethod::SpecTable, "k[0]", "src-1", vec![]);
        let c2 = Candidate::new("weight", "70 g", CandidateMethod::SpecTable, "k[1]", "src-1", vec![]);
        let candidates = [c1, c2];
        let clusters = [cluster("good", "Logitech", "G Pro X Superlight"), cluster("bad", "Razer", "Viper")];
        let lock = lock();
        let tagged = tag_candidates(&candidates, &clusters, &lock, |c| {
            if c.value == "63 g" { Some("good") } else { Some("bad") }
        });
        assert_eq!(tagged.len(), 2);
        let survivors = drop_unmatched(tagged);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].0.value, "63 g");
    }
}
