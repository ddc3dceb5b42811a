// SPDX-License-Identifier: MIT OR Apache-2.0
//! Budget guard: per-round, per-product, and monthly call limits
//! (`spec.md` §4.9 "Budget guard").

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering::Relaxed};
use std::sync::Arc;

/// Caps checked before every LLM call. `None` means that dimension is
/// unlimited.
#[derive(Debug, Clone, Default)]
pub struct BudgetLimits {
    /// Max LLM calls dispatched within the current round.
    pub max_calls_per_round: Option<u32>,
    /// Max LLM calls dispatched across the whole product run.
    pub max_calls_per_product: Option<u32>,
    /// Max cumulative cost for the current product run.
    pub product_budget_usd: Option<f64>,
    /// Max cumulative cost across the whole month, shared by every product
    /// run in the process.
    pub monthly_budget_usd: Option<f64>,
}

/// Why a call was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetBlockReason {
    /// `max_calls_per_round` reached.
    MaxCallsPerRound,
    /// `max_calls_per_product` reached.
    MaxCallsPerProduct,
    /// `product_budget_usd` reached.
    ProductBudgetExceeded,
    /// `monthly_budget_usd` reached and the call was not marked essential.
    MonthlyBudgetExceeded,
}

impl BudgetBlockReason {
    /// Stable reason token recorded on the round summary
    /// (`spec.md` §4.9: "the round records `llm_budget_guard_blocked`").
    #[must_use]
    pub fn as_str(self) -> &'static str {
        "llm_budget_guard_blocked"
    }
}

/// Outcome of a pre-call budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetDecision {
    /// The call may proceed.
    Allow,
    /// The call is blocked and should be queued for a future round.
    Block(BudgetBlockReason),
}

/// Monthly cost counter shared across every product run in the process
/// (`spec.md` §4.9: monthly budget spans the whole month, not one product).
#[derive(Debug, Default)]
pub struct MonthlyCostTracker {
    cost_micro: AtomicU64,
}

impl MonthlyCostTracker {
    /// Start a tracker at zero spend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cost increment in USD.
    pub fn record(&self, usd: f64) {
        let micros = (usd.max(0.0) * 1_000_000.0) as u64;
        self.cost_micro.fetch_add(micros, Relaxed);
    }

    /// Total cost recorded so far, in USD.
    #[must_use]
    pub fn total_usd(&self) -> f64 {
        self.cost_micro.load(Relaxed) as f64 / 1_000_000.0
    }
}

/// Thread-safe budget guard for one product run, backed by atomic counters.
///
/// Only one dimension bypasses its own exceeded-budget block: once the
/// monthly budget is exceeded, calls marked `essential` (identity
/// resolution, critical-field extraction) still proceed; all others are
/// blocked until the guard is disabled or the month rolls over.
pub struct BudgetGuard {
    limits: BudgetLimits,
    calls_this_round: AtomicU32,
    calls_this_product: AtomicU32,
    product_cost_micro: AtomicU64,
    monthly: Arc<MonthlyCostTracker>,
}

impl BudgetGuard {
    /// Build a guard for one product run, sharing `monthly` with every
    /// other concurrently-running product.
    #[must_use]
    pub fn new(limits: BudgetLimits, monthly: Arc<MonthlyCostTracker>) -> Self {
        Self {
            limits,
            calls_this_round: AtomicU32::new(0),
            calls_this_product: AtomicU32::new(0),
            product_cost_micro: AtomicU64::new(0),
            monthly,
        }
    }

    /// Reset the per-round call counter at a round boundary.
    pub fn start_round(&self) {
        self.calls_this_round.store(0, Relaxed);
    }

    /// Cumulative cost charged to this product run so far, in USD.
    #[must_use]
    pub fn product_cost_usd(&self) -> f64 {
        self.product_cost_micro.load(Relaxed) as f64 / 1_000_000.0
    }

    /// Check whether a call may proceed, in the order `spec.md` §4.9 lists:
    /// per-round calls, per-product calls, product cost, monthly cost.
    #[must_use]
    pub fn check(&self, essential: bool) -> BudgetDecision {
        if let Some(max) = self.limits.max_calls_per_round
            && self.calls_this_round.load(Relaxed) >= max
        {
            return BudgetDecision::Block(BudgetBlockReason::MaxCallsPerRound);
        }
        if let Some(max) = self.limits.max_calls_per_product
            && self.calls_this_product.load(Relaxed) >= max
        {
            return BudgetDecision::Block(BudgetBlockReason::MaxCallsPerProduct);
        }
        if let Some(max) = self.limits.product_budget_usd
            && self.product_cost_usd() >= max
        {
            return BudgetDecision::Block(BudgetBlockReason::ProductBudgetExceeded);
        }
        if let Some(max) = self.limits.monthly_budget_usd
            && self.monthly.total_usd() >= max
            && !essential
        {
            return BudgetDecision::Block(BudgetBlockReason::MonthlyBudgetExceeded);
        }
        BudgetDecision::Allow
    }

    /// Record a completed call's cost against both the per-product and
    /// shared monthly counters, and bump the call counters. Call only after
    /// `check` allowed the call.
    pub fn record_call(&self, cost_usd: f64) {
        self.calls_this_round.fetch_add(1, Relaxed);
        self.calls_this_product.fetch_add(1, Relaxed);
        let micros = (cost_usd.max(0.0) * 1_000_000.0) as u64;
        self.product_cost_micro.fetch_add(micros, Relaxed);
        self.monthly.record(cost_usd);
    }
}
