// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Structured telemetry and per-round metrics collection for engine runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::info;

// ---------------------------------------------------------------------------
// RoundMetrics
// ---------------------------------------------------------------------------

/// Metrics captured for a single round of a single product run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoundMetrics {
    /// Product this round belongs to.
    pub product_id: String,
    /// Round number, 0-indexed.
    pub round: u32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
    /// Sources fetched this round.
    pub sources_fetched: u64,
    /// Sources that failed every fallback-ladder fetch mode.
    pub sources_failed: u64,
    /// LLM calls issued this round.
    pub llm_calls: u64,
    /// LLM calls blocked by the budget guard this round.
    pub llm_budget_guard_blocked: u64,
    /// Total LLM cost incurred this round, in USD.
    pub llm_cost_usd: f64,
    /// Candidates promoted into consensus this round.
    pub candidates_promoted: u64,
    /// Required fields newly filled this round.
    pub fields_gained: u64,
    /// Errors encountered this round (extractor exceptions, schema
    /// violations, dropped candidates).
    pub errors_count: u64,
}

// ---------------------------------------------------------------------------
// MetricsSummary
// ---------------------------------------------------------------------------

/// Aggregated statistics across multiple recorded rounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSummary {
    /// Number of rounds recorded.
    pub count: usize,
    /// Mean round duration in milliseconds.
    pub mean_duration_ms: f64,
    /// Median (p50) round duration in milliseconds.
    pub p50_duration_ms: f64,
    /// 99th-percentile round duration in milliseconds.
    pub p99_duration_ms: f64,
    /// Total LLM cost across all recorded rounds, in USD.
    pub total_llm_cost_usd: f64,
    /// Total sources fetched across all recorded rounds.
    pub total_sources_fetched: u64,
    /// Error rate (errors / total rounds).
    pub error_rate: f64,
    /// Per-product round counts (deterministic ordering).
    pub product_counts: BTreeMap<String, usize>,
}

impl Default for MetricsSummary {
    fn default() -> Self {
        Self {
            count: 0,
            mean_duration_ms: 0.0,
            p50_duration_ms: 0.0,
            p99_duration_ms: 0.0,
            total_llm_cost_usd: 0.0,
            total_sources_fetched: 0,
            error_rate: 0.0,
            product_counts: BTreeMap::new(),
        }
    }
}

/// Compute a percentile value from a **sorted** slice.
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0] as f64;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac
}

// ---------------------------------------------------------------------------
// MetricsCollector
// ---------------------------------------------------------------------------

/// Thread-safe collector for round metrics.
///
/// Wrap in an `Arc` to share across worker pools (the inner storage is
/// already behind a `Mutex`).
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<Vec<RoundMetrics>>>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new, empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record a completed round's metrics.
    pub fn record(&self, metrics: RoundMetrics) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.push(metrics);
    }

    /// Return all recorded round metrics.
    #[must_use]
    pub fn rounds(&self) -> Vec<RoundMetrics> {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.clone()
    }

    /// Number of rounds recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        let data = self.inner.lock().expect("metrics lock poisoned");
        data.len()
    }

    /// Whether the collector has no recorded rounds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compute an aggregated summary of all recorded rounds.
    #[must_use]
    pub fn summary(&self) -> MetricsSummary {
        let data = self.inner.lock().expect("metrics lock poisoned");
        if data.is_empty() {
            return MetricsSummary::default();
        }

        let count = data.len();
        let mut durations: Vec<u64> = data.iter().map(|r| r.duration_ms).collect();
        durations.sort_unstable();

        let total_duration: u64 = durations.iter().sum();
        let mean_duration_ms = total_duration as f64 / count as f64;
        let p50_duration_ms = percentile(&durations, 50.0);
        let p99_duration_ms = percentile(&durations, 99.0);

        let total_llm_cost_usd: f64 = data.iter().map(|r| r.llm_cost_usd).sum();
        let total_sources_fetched: u64 = data.iter().map(|r| r.sources_fetched).sum();

        let errors: u64 = data.iter().map(|r| r.errors_count).sum();
        let error_rate = errors as f64 / count as f64;

        let mut product_counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in data.iter() {
            *product_counts.entry(r.product_id.clone()).or_insert(0) += 1;
        }

        MetricsSummary {
            count,
            mean_duration_ms,
            p50_duration_ms,
            p99_duration_ms,
            total_llm_cost_usd,
            total_sources_fetched,
            error_rate,
            product_counts,
        }
    }

    /// Clear all recorded metrics.
    pub fn clear(&self) {
        let mut data = self.inner.lock().expect("metrics lock poisoned");
        data.clear();
    }
}

// ---------------------------------------------------------------------------
// TelemetrySpan
// ---------------------------------------------------------------------------

/// A structured span for tracing integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySpan {
    /// Span name / operation.
    pub name: String,
    /// Arbitrary key-value attributes (deterministic ordering).
    pub attributes: BTreeMap<String, String>,
}

impl TelemetrySpan {
    /// Create a new span with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Insert an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Emit the span via `tracing::info!`.
    pub fn emit(&self) {
        info!(
            span_name = %self.name,
            attributes = ?self.attributes,
            "telemetry_span"
        );
    }
}

// ---------------------------------------------------------------------------
// TelemetryExporter
// ---------------------------------------------------------------------------

/// Trait for exporting collected metrics.
pub trait TelemetryExporter: Send + Sync {
    /// Export the given summary. Returns the serialized output on success.
    fn export(&self, summary: &MetricsSummary) -> Result<String, String>;
}

/// Exports metrics as pretty-printed JSON to a string.
#[derive(Debug, Default)]
pub struct JsonExporter;

impl TelemetryExporter for JsonExporter {
    fn export(&self, summary: &MetricsSummary) -> Result<String, String> {
        serde_json::to_string_pretty(summary).map_err(|e| e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn sample_metrics(product: &str, duration: u64, errors: u64) -> RoundMetrics {
        RoundMetrics {
            product_id: product.to_string(),
            round: 0,
            duration_ms: duration,
            sources_fetched: 5,
            sources_failed: 0,
            llm_calls: 3,
            llm_budget_guard_blocked: 0,
            llm_cost_usd: 0.02,
            candidates_promoted: 4,
            fields_gained: 2,
            errors_count: errors,
        }
    }

    #[test]
    fn collector_new_is_empty() {
        let c = MetricsCollector::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn collector_record_and_len() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("mice-1", 100, 0));
        assert_eq!(c.len(), 1);
        assert!(!c.is_empty());
    }

    #[test]
    fn collector_rounds_returns_all() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("a", 10, 0));
        c.record(sample_metrics("b", 20, 0));
        let rounds = c.rounds();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].product_id, "a");
        assert_eq!(rounds[1].product_id, "b");
    }

    #[test]
    fn collector_clear() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("x", 50, 0));
        c.clear();
        assert!(c.is_empty());
    }

    #[test]
    fn empty_collector_summary() {
        let c = MetricsCollector::new();
        let s = c.summary();
        assert_eq!(s.count, 0);
        assert_eq!(s.mean_duration_ms, 0.0);
        assert_eq!(s.total_llm_cost_usd, 0.0);
        assert!(s.product_counts.is_empty());
    }

    #[test]
    fn single_round_summary_matches() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("mice-1", 42, 0));
        let s = c.summary();
        assert_eq!(s.count, 1);
        assert_eq!(s.mean_duration_ms, 42.0);
        assert_eq!(s.p50_duration_ms, 42.0);
        assert_eq!(s.p99_duration_ms, 42.0);
        assert!((s.total_llm_cost_usd - 0.02).abs() < 1e-9);
        assert_eq!(s.total_sources_fetched, 5);
        assert_eq!(s.product_counts["mice-1"], 1);
    }

    #[test]
    fn summary_mean_duration() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("a", 100, 0));
        c.record(sample_metrics("a", 200, 0));
        c.record(sample_metrics("a", 300, 0));
        let s = c.summary();
        assert!((s.mean_duration_ms - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_p50_odd_count() {
        let c = MetricsCollector::new();
        for d in [10, 20, 30, 40, 50] {
            c.record(sample_metrics("a", d, 0));
        }
        let s = c.summary();
        assert!((s.p50_duration_ms - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_p99() {
        let c = MetricsCollector::new();
        for d in 1..=100 {
            c.record(sample_metrics("a", d, 0));
        }
        let s = c.summary();
        assert!(s.p99_duration_ms > 98.0);
        assert!(s.p99_duration_ms <= 100.0);
    }

    #[test]
    fn summary_error_rate() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("a", 10, 1));
        c.record(sample_metrics("a", 20, 0));
        c.record(sample_metrics("a", 30, 2));
        let s = c.summary();
        assert!((s.error_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn summary_product_counts() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("alpha", 10, 0));
        c.record(sample_metrics("beta", 20, 0));
        c.record(sample_metrics("alpha", 30, 0));
        let s = c.summary();
        assert_eq!(s.product_counts["alpha"], 2);
        assert_eq!(s.product_counts["beta"], 1);
    }

    #[test]
    fn round_metrics_serde_roundtrip() {
        let m = sample_metrics("serde-test", 999, 2);
        let json = serde_json::to_string(&m).unwrap();
        let m2: RoundMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(m, m2);
    }

    #[test]
    fn concurrent_recording() {
        let c = MetricsCollector::new();
        let mut handles = vec![];
        for i in 0..10 {
            let cc = c.clone();
            handles.push(thread::spawn(move || {
                cc.record(sample_metrics("thread", i * 10, 0));
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(c.len(), 10);
    }

    #[test]
    fn telemetry_span_attributes() {
        let span = TelemetrySpan::new("fetch_round")
            .with_attribute("product_id", "mice-1")
            .with_attribute("round", "2");
        assert_eq!(span.name, "fetch_round");
        assert_eq!(span.attributes.len(), 2);
        assert_eq!(span.attributes["product_id"], "mice-1");
    }

    #[test]
    fn json_exporter_valid_output() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("mice-1", 100, 0));
        let s = c.summary();
        let exporter = JsonExporter;
        let json = exporter.export(&s).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["count"], 1);
    }

    #[test]
    fn json_exporter_product_counts_deterministic() {
        let c = MetricsCollector::new();
        c.record(sample_metrics("zebra", 10, 0));
        c.record(sample_metrics("alpha", 20, 0));
        let s = c.summary();
        let exporter = JsonExporter;
        let json = exporter.export(&s).unwrap();
        let keys_start = json.find("\"alpha\"").unwrap();
        let keys_end = json.find("\"zebra\"").unwrap();
        assert!(keys_start < keys_end);
    }

    #[test]
    fn percentile_empty() {
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn percentile_single() {
        assert_eq!(percentile(&[42], 99.0), 42.0);
    }
}
