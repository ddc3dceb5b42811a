//! Billing Entry — one immutable cost-ledger row per LLM call.
//!
//! See `spec.md` §3.8.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One immutable cost-ledger row, appended once per LLM call.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BillingEntry {
    /// RFC 3339 timestamp of the call.
    pub ts: String,
    /// `YYYY-MM`, used to key the monthly ledger file.
    pub month: String,
    /// Day of month, `1..=31`.
    pub day: u8,
    /// LLM provider name.
    pub provider: String,
    /// Model identifier actually invoked.
    pub model: String,
    /// Product category.
    pub category: String,
    /// Product slug.
    pub product_id: String,
    /// Run this call belongs to.
    pub run_id: String,
    /// Round number within the run.
    pub round: u32,
    /// Prompt tokens billed.
    pub prompt_tokens: u64,
    /// Completion tokens billed.
    pub completion_tokens: u64,
    /// Prompt tokens served from cache (billed at a discount, if any).
    pub cached_prompt_tokens: u64,
    /// Computed cost in USD.
    pub cost_usd: f64,
    /// Why this call was made (e.g. `"extract:encoder_model"`).
    pub reason: String,
    /// Host the evidence pack sent in this call was sourced from, if
    /// single-source; empty for multi-source packets.
    pub host: String,
    /// Evidence character count sent in the prompt.
    pub evidence_chars: u32,
    /// `true` if cost was estimated rather than read from provider usage.
    pub estimated_usage: bool,
}
