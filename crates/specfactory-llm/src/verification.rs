// SPDX-License-Identifier: MIT OR Apache-2.0
//! Verification mode: periodically re-dispatch a field's LLM route and diff
//! the re-run against the round's resolved value, without feeding the
//! result back into consensus (`spec.md` §4.9 "Verification mode").

use crate::budget::BudgetGuard;
use crate::router::{CallOutcome, CallRequest, LlmRouter};
use specfactory_capability::LlmClient;
use specfactory_evidence::{diff_field_values, VerificationDelta};
use specfactory_routematrix::{RouteMatrix, RouteQuery};
use specfactory_types::RouteScope;
use std::collections::BTreeMap;

/// Storage key for the verification delta recorded on one round
/// (`spec.md` §6.2 layout, extended to the verification report).
#[must_use]
pub fn verification_key(run_id: &str, round: u32, field: &str) -> String {
    format!("_verification/{run_id}/{round}/{field}.json")
}

/// Deterministically decide whether `run_id`'s `round` falls inside the
/// verification sample, given `sample_rate` in `[0, 1]`.
///
/// Hashes `(run_id, round)` into a stable `[0, 1)` fraction rather than
/// drawing from a PRNG, so a run's sampling decisions are reproducible from
/// its run id alone and don't need a seeded generator threaded through the
/// controller.
#[must_use]
pub fn should_sample(run_id: &str, round: u32, sample_rate: f64) -> bool {
    if sample_rate <= 0.0 {
        return false;
    }
    if sample_rate >= 1.0 {
        return true;
    }
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    run_id.hash(&mut hasher);
    round.hash(&mut hasher);
    let fraction = (hasher.finish() as f64) / (u64::MAX as f64);
    fraction < sample_rate
}

/// Re-dispatch `field`'s LLM route against `payload` — the same evidence a
/// baseline deterministic/LLM extraction already saw — and diff the
/// re-run's emitted value against `baseline`'s resolved value for that
/// field.
///
/// Returns `Ok(None)` when the route didn't dispatch (no matching route, a
/// budget block, a capability mismatch): a verification sample that can't
/// run is simply skipped, never counted as a disagreement.
pub async fn sample_and_reverify(
    router: &LlmRouter,
    matrix: &RouteMatrix,
    guard: &BudgetGuard,
    client: &dyn LlmClient,
    field: &str,
    required_level: &str,
    payload: serde_json::Value,
    baseline: &BTreeMap<String, String>,
) -> anyhow::Result<Option<VerificationDelta>> {
    let query = RouteQuery { field, scope: RouteScope::Scalar, required_level };
    let outcome = router
        .dispatch(matrix, guard, client, CallRequest { query, payload, essential: false })
        .await;

    let CallOutcome::Dispatched { response, .. } = outcome else {
        return Ok(None);
    };

    let mut verification = BTreeMap::new();
    if let Some(candidates) = response.get("candidates").and_then(serde_json::Value::as_array) {
        for candidate in candidates {
            if candidate.get("field").and_then(serde_json::Value::as_str) != Some(field) {
                continue;
            }
            if let Some(value) = candidate.get("value").and_then(serde_json::Value::as_str) {
                verification.insert(field.to_string(), value.to_string());
            }
        }
    }

    Ok(Some(diff_field_values(baseline, &verification)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{BudgetLimits, MonthlyCostTracker};
    use crate::pricing::PricingTable;
    use async_trait::async_trait;
    use serde_json::json;
    use specfactory_capability::LlmCapabilityManifest;
    use specfactory_routematrix::{RouteCondition, RouteRule};
    use specfactory_types::{InsufficientEvidenceAction, RouteDecision, SendPacket};
    use std::collections::BTreeSet;
    use std::sync::Arc;

    struct StubClient {
        response: serde_json::Value,
    }

    #[async_trait]
    impl LlmClient for StubClient {
        fn capabilities(&self) -> LlmCapabilityManifest {
            LlmCapabilityManifest {
                supported_models: BTreeSet::from(["strong".to_string()]),
                websearch_supported: false,
                max_tokens_ceiling: 4096,
            }
        }

        async fn call(&self, _route: &RouteDecision, _payload: serde_json::Value) -> anyhow::Result<serde_json::Value> {
            Ok(self.response.clone())
        }
    }

    fn matrix() -> RouteMatrix {
        let mut matrix = RouteMatrix::new();
        matrix.add_rule(RouteRule {
            id: "r1".into(),
            description: "scalar fields".into(),
            condition: RouteCondition::ScopeIs(RouteScope::Scalar),
            effort: 1,
            decision: RouteDecision {
                field: "weight".into(),
                scope: RouteScope::Scalar,
                model_ladder: vec!["strong".into()],
                all_source_data: false,
                enable_websearch: false,
                max_tokens: 1024,
                send_packet: SendPacket::ValuesOnly,
                min_evidence_refs_required: 1,
                insufficient_evidence_action: InsufficientEvidenceAction::Drop,
            },
        });
        matrix
    }

    fn guard() -> BudgetGuard {
        BudgetGuard::new(BudgetLimits::default(), Arc::new(MonthlyCostTracker::new()))
    }

    #[test]
    fn sample_rate_zero_never_samples() {
        assert!(!should_sample("run-1", 0, 0.0));
        assert!(!should_sample("run-1", 5, 0.0));
    }

    #[test]
    fn sample_rate_one_always_samples() {
        assert!(should_sample("run-1", 0, 1.0));
        assert!(should_sample("run-1", 99, 1.0));
    }

    #[test]
    fn sampling_decision_is_deterministic_for_the_same_run_and_round() {
        assert_eq!(should_sample("run-1", 3, 0.3), should_sample("run-1", 3, 0.3));
    }

    #[tokio::test]
    async fn disagreement_is_recorded_when_the_rerun_differs() {
        let client = StubClient {
            response: json!({
                "candidates": [{"field": "weight", "value": "64 g"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "cached_prompt_tokens": 0},
            }),
        };
        let router = LlmRouter::new(PricingTable::default());
        let baseline = BTreeMap::from([("weight".to_string(), "63 g".to_string())]);
        let delta = sample_and_reverify(
            &router,
            &matrix(),
            &guard(),
            &client,
            "weight",
            "required",
            json!({"snippets": []}),
            &baseline,
        )
        .await
        .unwrap()
        .expect("route dispatched");
        assert_eq!(delta.disagreements().len(), 1);
    }

    #[tokio::test]
    async fn agreement_records_no_disagreements() {
        let client = StubClient {
            response: json!({
                "candidates": [{"field": "weight", "value": "63 g"}],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "cached_prompt_tokens": 0},
            }),
        };
        let router = LlmRouter::new(PricingTable::default());
        let baseline = BTreeMap::from([("weight".to_string(), "63 g".to_string())]);
        let delta = sample_and_reverify(
            &router,
            &matrix(),
            &guard(),
            &client,
            "weight",
            "required",
            json!({"snippets": []}),
            &baseline,
        )
        .await
        .unwrap()
        .expect("route dispatched");
        assert!(delta.disagreements().is_empty());
    }

    #[tokio::test]
    async fn unmatched_route_returns_no_delta() {
        let client = StubClient { response: json!({}) };
        let router = LlmRouter::new(PricingTable::default());
        let baseline = BTreeMap::new();
        let delta = sample_and_reverify(
            &router,
            &RouteMatrix::new(),
            &guard(),
            &client,
            "weight",
            "required",
            json!({}),
            &baseline,
        )
        .await
        .unwrap();
        assert!(delta.is_none());
    }
}
