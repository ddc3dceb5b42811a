// SPDX-License-Identifier: MIT OR Apache-2.0
//! Route resolution and call dispatch (`spec.md` §4.9 "Route resolution",
//! "LLM call contract").

use crate::budget::{BudgetDecision, BudgetGuard};
use crate::pricing::{PricingTable, TokenUsage};
use specfactory_capability::{ensure_route_supported, LlmCapabilityManifest, LlmClient};
use specfactory_routematrix::{RouteMatrix, RouteQuery};
use specfactory_types::RouteDecision;
use tracing::{info, warn};

/// One LLM call to resolve and dispatch.
pub struct CallRequest<'a> {
    /// Key identifying which route matrix row applies.
    pub query: RouteQuery<'a>,
    /// User payload to send once a route is resolved.
    pub payload: serde_json::Value,
    /// `true` for identity resolution or critical-field extraction — exempt
    /// from the monthly-budget block (`spec.md` §4.9).
    pub essential: bool,
}

/// Result of resolving and attempting one LLM call.
#[derive(Debug)]
pub enum CallOutcome {
    /// The call was dispatched and returned a response.
    Dispatched {
        /// Model actually invoked (first entry of the ladder the backend
        /// supports).
        model: String,
        /// Raw JSON response body.
        response: serde_json::Value,
        /// Normalized token usage.
        usage: TokenUsage,
        /// Computed cost in USD.
        cost_usd: f64,
    },
    /// No route matrix row matched the query; nothing to dispatch.
    NoRouteMatched,
    /// The budget guard blocked the call.
    BudgetBlocked(crate::budget::BudgetBlockReason),
    /// The resolved route isn't satisfiable by the configured backend.
    CapabilityUnsupported(String),
    /// The backend call itself failed.
    CallFailed(String),
}

/// Resolves route matrix rows to a [`RouteDecision`] and drives the
/// budget-gated dispatch described in `spec.md` §4.9.
pub struct LlmRouter {
    pricing: PricingTable,
}

impl LlmRouter {
    /// Build a router using the given pricing table.
    #[must_use]
    pub fn new(pricing: PricingTable) -> Self {
        Self { pricing }
    }

    /// Resolve a [`CallRequest`] against `matrix`, check the budget guard
    /// and backend capability, then dispatch through `client`.
    pub async fn dispatch(
        &self,
        matrix: &RouteMatrix,
        guard: &BudgetGuard,
        client: &dyn LlmClient,
        request: CallRequest<'_>,
    ) -> CallOutcome {
        let Some(route) = matrix.resolve(&request.query) else {
            return CallOutcome::NoRouteMatched;
        };

        match guard.check(request.essential) {
            BudgetDecision::Allow => {}
            BudgetDecision::Block(reason) => {
                warn!(field = route.field, ?reason, "llm_budget_guard_blocked");
                return CallOutcome::BudgetBlocked(reason);
            }
        }

        let manifest = client.capabilities();
        if let Err(err) = ensure_route_supported(route, &manifest) {
            warn!(field = route.field, error = %err, "route unsatisfiable by backend");
            return CallOutcome::CapabilityUnsupported(err.to_string());
        }

        let model = first_supported_model(route, &manifest)
            .expect("ensure_route_supported guarantees at least one supported model");

        match client.call(route, request.payload).await {
            Ok(response) => {
                let usage = extract_usage(&response);
                let cost_usd = self.pricing.cost_usd(&model, usage);
                guard.record_call(cost_usd);
                info!(field = route.field, model, cost_usd, "llm call dispatched");
                CallOutcome::Dispatched { model, response, usage, cost_usd }
            }
            Err(err) => {
                warn!(field = route.field, model, error = %err, "llm call failed");
                CallOutcome::CallFailed(err.to_string())
            }
        }
    }
}

fn first_supported_model(route: &RouteDecision, manifest: &LlmCapabilityManifest) -> Option<String> {
    route.model_ladder.iter().find(|m| manifest.supported_models.contains(*m)).cloned()
}

/// Pull `{prompt_tokens, completion_tokens, cached_prompt_tokens}` out of a
/// response's `usage` object, defaulting absent fields to zero
/// (`spec.md` §4.9 "Normalize usage").
fn extract_usage(response: &serde_json::Value) -> TokenUsage {
    let usage = response.get("usage");
    let field = |name: &str| usage.and_then(|u| u.get(name)).and_then(serde_json::Value::as_u64).unwrap_or(0);
    TokenUsage {
        prompt_tokens: field("prompt_tokens"),
        completion_tokens: field("completion_tokens"),
        cached_prompt_tokens: field("cached_prompt_tokens"),
    }
}
