// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end round-controller scenarios, wired through the real planner,
//! extractors, consensus engine, and gates against an in-memory Spec DB.
//!
//! Each test drives one full round through [`RoundController`] with
//! [`specfactory_testsupport`]'s mock collaborators standing in for the
//! network, LLM, and blob store, then asserts on the resulting
//! [`RoundSummary`].

use specfactory_capability::LlmCapabilityManifest;
use specfactory_config::CategorySchema;
use specfactory_consensus::FieldRule;
use specfactory_gates::IdentityGateDecision;
use specfactory_llm::{BudgetGuard, BudgetLimits, MonthlyCostTracker, PricingTable};
use specfactory_planner::{NoHelperDatabase, PlannerLimits};
use specfactory_routematrix::RouteMatrix;
use specfactory_runtime::{CancellationToken, ControllerConfig, RoundController, StopReason};
use specfactory_specdb::SpecDb;
use specfactory_storage::NdjsonLedgerSink;
use specfactory_testsupport::{MockFetcher, MockLlmClient, MockStorage, MockStructuredMetadataParser};
use specfactory_types::{Anchors, FieldValue, IdentityLock, ProductJob, Requirements, Tier};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every scenario runs a single round (`fast` mode's cap), so `evaluate_stop`
/// always reaches a terminal decision without ever needing a scripted LLM
/// response: the escalation block only fires when no stop condition has
/// already matched, and `next_round(1) >= max_rounds(1)` guarantees one has.
const MAX_ROUNDS: u32 = 1;

fn no_budget() -> BudgetGuard {
    BudgetGuard::new(
        BudgetLimits {
            max_calls_per_round: None,
            max_calls_per_product: None,
            product_budget_usd: None,
            monthly_budget_usd: None,
        },
        Arc::new(MonthlyCostTracker::new()),
    )
}

async fn run_controller(
    job: ProductJob,
    schema: CategorySchema,
    approved_hosts: Vec<String>,
    fetcher: MockFetcher,
) -> Vec<specfactory_runtime::RoundSummary> {
    let storage = Arc::new(MockStorage::new());
    let ledger = Arc::new(NdjsonLedgerSink::new(storage.clone()));
    let llm_client = Arc::new(MockLlmClient::new(LlmCapabilityManifest::default(), vec![]));
    let specdb = SpecDb::open_in_memory().await.expect("open in-memory spec db");

    let config = ControllerConfig {
        schema,
        approved_hosts,
        denied_hosts: Vec::new(),
        planner_limits: PlannerLimits::default(),
        max_rounds: MAX_ROUNDS,
        marginal_yield_threshold: 0.02,
        constraints: Vec::new(),
        budget: no_budget(),
        pricing: PricingTable::empty(),
        run_id: "test-run".to_string(),
        llm_provider: "none".to_string(),
        verification_sample_rate: 0.0,
    };

    let mut controller = RoundController::new(
        job,
        config,
        Arc::new(fetcher),
        Arc::new(MockStructuredMetadataParser::empty()),
        llm_client,
        ledger,
        storage,
        RouteMatrix::new(),
        specdb,
        &NoHelperDatabase,
        CancellationToken::new(),
    )
    .expect("build round controller");

    controller.run().await.expect("run to completion")
}

/// Round 0 on a single manufacturer source with a matching anchor locks
/// identity, resolves both fields above their pass target, and stops
/// `satisfied` before the round cap is even consulted.
#[tokio::test]
async fn happy_path_single_manufacturer_source_satisfies_the_run() {
    let job = ProductJob {
        category: "mice".to_string(),
        product_id: "logitech-pro-x-superlight".to_string(),
        identity_lock: IdentityLock {
            brand: "Logitech".to_string(),
            model: "Pro X Superlight".to_string(),
            variant: Some("Superlight".to_string()),
            ..IdentityLock::default()
        },
        requirements: Requirements {
            required_fields: vec!["weight".to_string(), "connection".to_string()],
            target_completeness: 0.9,
            target_confidence: 0.8,
            llm_target_fields: Vec::new(),
        },
        anchors: Anchors::from([("connection".to_string(), "wireless".to_string())]),
        seed_urls: vec!["https://logitechg.com/pro-x-superlight".to_string()],
    };

    let schema = CategorySchema {
        field_rules: vec![
            FieldRule::default_for("weight", "expected"),
            FieldRule::default_for("connection", "expected"),
        ],
        field_pointers: BTreeMap::from([
            ("name".to_string(), vec!["/name".to_string()]),
            ("weight".to_string(), vec!["/weight".to_string()]),
            ("connection".to_string(), vec!["/connection".to_string()]),
        ]),
        ..CategorySchema::default()
    };

    let fetcher = MockFetcher::new().with_html(
        "https://logitechg.com/pro-x-superlight",
        r#"{"name": "Logitech Pro X Superlight", "weight": "63 g", "connection": "Wireless"}"#,
    );

    let summaries = run_controller(job, schema, vec!["logitechg.com".to_string()], fetcher).await;

    assert_eq!(summaries.len(), 1);
    let round = &summaries[0];
    assert_eq!(round.stop_reason, Some(StopReason::Satisfied));
    assert_eq!(round.identity_decision, IdentityGateDecision::IdentityLockedFull);
    assert!(round.quality.validated);

    let weight = &round.provenance["weight"];
    assert_eq!(weight.value, FieldValue::Scalar { value: "63 g".to_string() });
    assert!(weight.meets_pass_target);
    assert_eq!(weight.evidence[0].tier, Tier::Manufacturer);

    let connection = &round.provenance["connection"];
    assert_eq!(connection.value, FieldValue::Scalar { value: "Wireless".to_string() });
    assert!(connection.meets_pass_target);
}

/// A manufacturer source and a lower-tier candidate source disagree on
/// `weight`; `resolve_by_tier_else_unknown` picks the manufacturer's value
/// because its tier-weighted cluster score clears the candidate cluster's,
/// rather than falling back to `unk`.
#[tokio::test]
async fn tier_weighted_conflict_resolves_to_the_manufacturer_value() {
    let job = ProductJob {
        category: "mice".to_string(),
        product_id: "logitech-pro-x-superlight".to_string(),
        requirements: Requirements {
            required_fields: vec!["weight".to_string()],
            target_completeness: 1.0,
            target_confidence: 1.0,
            llm_target_fields: Vec::new(),
        },
        seed_urls: vec![
            "https://logitechg.com/pro-x-superlight".to_string(),
            "https://retailer-a.example.com/pro-x-superlight".to_string(),
        ],
        ..ProductJob::default()
    };

    let schema = CategorySchema {
        field_rules: vec![FieldRule::default_for("weight", "expected")],
        field_pointers: BTreeMap::from([("weight".to_string(), vec!["/weight".to_string()])]),
        ..CategorySchema::default()
    };

    let fetcher = MockFetcher::new()
        .with_html("https://logitechg.com/pro-x-superlight", r#"{"weight": "63 g"}"#)
        .with_html("https://retailer-a.example.com/pro-x-superlight", r#"{"weight": "75 g"}"#);

    let summaries = run_controller(job, schema, vec!["logitechg.com".to_string()], fetcher).await;

    assert_eq!(summaries.len(), 1);
    let round = &summaries[0];
    assert_eq!(round.stop_reason, Some(StopReason::MaxRoundsReached));

    let weight = &round.provenance["weight"];
    assert_eq!(weight.value, FieldValue::Scalar { value: "63 g".to_string() });
    assert!(weight.meets_pass_target);
    assert_eq!(weight.evidence[0].tier, Tier::Manufacturer);
}

/// A source that otherwise scores a strong brand/model/variant identity
/// match still contradicts a hard-locked anchor on `connection`. The anchor
/// conflict drops the only `connection` candidate to `unk`, forces the
/// identity gate to `IdentityConflict` even at high confidence, and the
/// round stops `identity_conflict_fatal` ahead of the round cap.
#[tokio::test]
async fn anchor_conflict_forces_an_identity_conflict_stop() {
    let job = ProductJob {
        category: "mice".to_string(),
        product_id: "logitech-pro-x-superlight".to_string(),
        identity_lock: IdentityLock {
            brand: "Logitech".to_string(),
            model: "Pro X Superlight".to_string(),
            variant: Some("Superlight".to_string()),
            ..IdentityLock::default()
        },
        requirements: Requirements {
            required_fields: vec!["connection".to_string()],
            target_completeness: 1.0,
            target_confidence: 1.0,
            llm_target_fields: Vec::new(),
        },
        anchors: Anchors::from([("connection".to_string(), "wireless".to_string())]),
        seed_urls: vec!["https://logitechg.com/pro-x-superlight".to_string()],
    };

    let schema = CategorySchema {
        field_rules: vec![FieldRule::default_for("connection", "expected")],
        field_pointers: BTreeMap::from([
            ("name".to_string(), vec!["/name".to_string()]),
            ("connection".to_string(), vec!["/connection".to_string()]),
        ]),
        ..CategorySchema::default()
    };

    let fetcher = MockFetcher::new().with_html(
        "https://logitechg.com/pro-x-superlight",
        r#"{"name": "Logitech Pro X Superlight", "connection": "Wired"}"#,
    );

    let summaries = run_controller(job, schema, vec!["logitechg.com".to_string()], fetcher).await;

    assert_eq!(summaries.len(), 1);
    let round = &summaries[0];
    assert_eq!(round.stop_reason, Some(StopReason::IdentityConflictFatal));
    assert!(matches!(round.identity_decision, IdentityGateDecision::IdentityConflict { .. }));
    if let IdentityGateDecision::IdentityConflict { reasons } = &round.identity_decision {
        assert!(reasons.iter().any(|r| r == "anchor_conflict"));
    }

    let connection = &round.provenance["connection"];
    assert_eq!(connection.value, FieldValue::Unk { reason: "anchor_conflict".to_string() });
    assert!(connection.reasoning.reasons.iter().any(|r| r == "anchor_conflict"));
}

/// `weight` extracts cleanly from a single source, but the category rule
/// demands two distinct evidence refs before a winning cluster is trusted.
/// One source binds exactly one evidence ref per candidate, so the field
/// is forced to `unk("below_min_evidence")` even though a value was found.
#[tokio::test]
async fn single_source_below_min_evidence_refs_stays_unknown() {
    let job = ProductJob {
        category: "mice".to_string(),
        product_id: "logitech-pro-x-superlight".to_string(),
        requirements: Requirements {
            required_fields: vec!["weight".to_string()],
            target_completeness: 1.0,
            target_confidence: 1.0,
            llm_target_fields: Vec::new(),
        },
        seed_urls: vec!["https://logitechg.com/pro-x-superlight".to_string()],
        ..ProductJob::default()
    };

    let mut weight_rule = FieldRule::default_for("weight", "required");
    weight_rule.min_evidence_refs_effective = 2;

    let schema = CategorySchema {
        field_rules: vec![weight_rule],
        field_pointers: BTreeMap::from([("weight".to_string(), vec!["/weight".to_string()])]),
        ..CategorySchema::default()
    };

    let fetcher = MockFetcher::new().with_html("https://logitechg.com/pro-x-superlight", r#"{"weight": "63 g"}"#);

    let summaries = run_controller(job, schema, vec!["logitechg.com".to_string()], fetcher).await;

    assert_eq!(summaries.len(), 1);
    let round = &summaries[0];
    assert_eq!(round.stop_reason, Some(StopReason::MaxRoundsReached));

    let weight = &round.provenance["weight"];
    assert_eq!(weight.value, FieldValue::Unk { reason: "below_min_evidence".to_string() });
    assert!(!weight.meets_pass_target);
    assert_eq!(weight.confirmations, 1);
    assert!(weight.evidence.is_empty());
    assert!(weight.reasoning.reasons.iter().any(|r| r == "below_min_evidence"));
}
