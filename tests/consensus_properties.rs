// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property test for the consensus engine's idempotent-re-run invariant,
//! placed at the workspace root since it needs `proptest` (a root dev-dep,
//! not a dependency of `specfactory-consensus` itself).

use proptest::prelude::*;
use specfactory_consensus::{evaluate_field, FieldRule};
use specfactory_types::{Anchors, Candidate, CandidateMethod, FetchMethod, Source, Tier};
use std::collections::{BTreeMap, HashSet};

fn source(id: &str, tier: Tier) -> Source {
    Source {
        source_id: id.into(),
        url: format!("https://{id}.example/p"),
        final_url: format!("https://{id}.example/p"),
        host: format!("{id}.example"),
        root_domain: format!("{id}.example"),
        tier,
        role: "product_page".into(),
        fetched_at: "2026-08-01T00:00:00Z".into(),
        http_status: Some(200),
        fetch_method: FetchMethod::Http,
        content_hash: "h1".into(),
        text_hash: "h2".into(),
    }
}

proptest! {
    /// Re-running `evaluate_field` on the exact same candidates, sources,
    /// and rule produces byte-identical sorted-key JSON every time — the
    /// `spec.md` §8 "idempotent consensus re-run" property. Consensus has
    /// no hidden mutable state (no RNG, no clock, no iteration-order
    /// dependence on unordered collections reaching the output).
    #[test]
    fn evaluate_field_is_idempotent_for_the_same_inputs(
        a in 1u32..200,
        tier_idx in 0usize..4,
    ) {
        let tier = [Tier::Manufacturer, Tier::LabDatabase, Tier::Retailer, Tier::Candidate][tier_idx];
        let sources = BTreeMap::from([("src-1".to_string(), source("src-1", tier))]);
        let candidates = vec![Candidate::new(
            "weight",
            format!("{a} g"),
            CandidateMethod::JsonLd,
            "offers.weight",
            "src-1",
            vec!["j01".into()],
        )];
        let rule = FieldRule::default_for("weight", "required");

        let run = || {
            let p = evaluate_field(
                &rule,
                &candidates,
                &sources,
                &HashSet::new(),
                &HashSet::new(),
                &Anchors::new(),
                1.0,
            );
            serde_json::to_string(&p).expect("serialize provenance")
        };

        let first = run();
        let second = run();
        prop_assert_eq!(first, second);
    }
}
