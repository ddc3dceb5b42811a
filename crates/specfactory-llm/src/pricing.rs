// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-model pricing table and cost computation (`spec.md` §4.9 "Cost
//! accounting").

use std::collections::BTreeMap;

/// Per-million-token USD rates for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelRate {
    /// USD per million prompt tokens.
    pub prompt_per_million: f64,
    /// USD per million completion tokens.
    pub completion_per_million: f64,
    /// USD per million cached-prompt tokens (typically a fraction of
    /// `prompt_per_million`).
    pub cached_prompt_per_million: f64,
}

/// Rate applied when a model has no table entry.
const DEFAULT_RATE: ModelRate = ModelRate {
    prompt_per_million: 3.0,
    completion_per_million: 15.0,
    cached_prompt_per_million: 0.30,
};

/// Normalized token usage for one LLM call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    /// Billed prompt tokens, excluding any served from cache.
    pub prompt_tokens: u64,
    /// Billed completion tokens.
    pub completion_tokens: u64,
    /// Prompt tokens served from cache, billed at the discounted rate.
    pub cached_prompt_tokens: u64,
}

/// Looks up per-model rates, falling back to a flat default when a model
/// has no table entry.
#[derive(Debug, Clone)]
pub struct PricingTable {
    rates: BTreeMap<String, ModelRate>,
}

impl Default for PricingTable {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(
            "cheap".to_string(),
            ModelRate { prompt_per_million: 0.25, completion_per_million: 1.25, cached_prompt_per_million: 0.025 },
        );
        rates.insert(
            "strong".to_string(),
            ModelRate { prompt_per_million: 3.0, completion_per_million: 15.0, cached_prompt_per_million: 0.30 },
        );
        rates.insert(
            "frontier".to_string(),
            ModelRate { prompt_per_million: 15.0, completion_per_million: 75.0, cached_prompt_per_million: 1.50 },
        );
        Self { rates }
    }
}

impl PricingTable {
    /// Build an empty table; every model falls back to [`DEFAULT_RATE`].
    #[must_use]
    pub fn empty() -> Self {
        Self { rates: BTreeMap::new() }
    }

    /// Register or replace the rate for `model`.
    pub fn set_rate(&mut self, model: impl Into<String>, rate: ModelRate) {
        self.rates.insert(model.into(), rate);
    }

    /// Rate for `model`, or the fallback default if unregistered.
    #[must_use]
    pub fn rate_for(&self, model: &str) -> ModelRate {
        self.rates.get(model).copied().unwrap_or(DEFAULT_RATE)
    }

    /// Compute the USD cost of one call under `model`'s rate.
    #[must_use]
    pub fn cost_usd(&self, model: &str, usage: TokenUsage) -> f64 {
        let rate = self.rate_for(model);
        let billable_prompt = usage.prompt_tokens.saturating_sub(usage.cached_prompt_tokens);
        billable_prompt as f64 / 1_000_000.0 * rate.prompt_per_million
            + usage.completion_tokens as f64 / 1_000_000.0 * rate.completion_per_million
            + usage.cached_prompt_tokens as f64 / 1_000_000.0 * rate.cached_prompt_per_million
    }
}
