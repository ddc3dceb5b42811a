// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tests for the `format` module covering both output formats across a
//! run's round summaries, a billing report, and `explain-unk` rows.

use specfactory_cli::commands::{BillingReport, ExplainUnkRow, ModelTotals};
use specfactory_cli::format::{Formatter, OutputFormat};
use specfactory_gates::{IdentityGateDecision, QualityGateReport};
use specfactory_runtime::{RoundSummary, StopReason};
use specfactory_types::DeficitReason;
use std::collections::BTreeMap;

fn sample_quality(validated: bool) -> QualityGateReport {
    QualityGateReport {
        completeness_required: 0.8,
        coverage_overall: 0.6,
        confidence: 0.91,
        validated,
        validated_reasons: Vec::new(),
    }
}

fn sample_round(round: u32, stop_reason: Option<StopReason>) -> RoundSummary {
    RoundSummary {
        round,
        stop_reason,
        identity_decision: IdentityGateDecision::IdentityLockedFull,
        quality: sample_quality(stop_reason == Some(StopReason::Satisfied)),
        provenance: BTreeMap::new(),
    }
}

fn sample_billing_report() -> BillingReport {
    let mut by_model = BTreeMap::new();
    by_model.insert(
        "gpt-5-mini".to_string(),
        ModelTotals { calls: 4, prompt_tokens: 1200, completion_tokens: 340, cost_usd: 0.18 },
    );
    BillingReport { month: "2026-08".to_string(), total_usd: 0.18, total_calls: 4, by_model }
}

fn sample_explain_unk_rows() -> Vec<ExplainUnkRow> {
    vec![
        ExplainUnkRow {
            field: "battery_life_hours".to_string(),
            deficit_reason: DeficitReason::Missing,
            unknown_reason: "not_found_after_search",
        },
        ExplainUnkRow {
            field: "sensor_dpi".to_string(),
            deficit_reason: DeficitReason::ConflictingSources,
            unknown_reason: "conflicting_sources_unresolved",
        },
    ]
}

// ── format_run ───────────────────────────────────────────────────────

#[test]
fn format_run_pretty_includes_each_round() {
    let formatter = Formatter::new(OutputFormat::Pretty);
    let summaries = vec![sample_round(0, None), sample_round(1, Some(StopReason::Satisfied))];
    let text = formatter.format_run(&summaries);
    assert!(text.contains("round 0"));
    assert!(text.contains("round 1"));
    assert!(text.contains("Satisfied"));
}

#[test]
fn format_run_pretty_on_no_rounds_says_so() {
    let formatter = Formatter::new(OutputFormat::Pretty);
    assert_eq!(formatter.format_run(&[]), "no rounds ran");
}

#[test]
fn format_run_json_is_parseable_and_has_one_entry_per_round() {
    let formatter = Formatter::new(OutputFormat::Json);
    let summaries = vec![sample_round(0, None), sample_round(1, Some(StopReason::Satisfied))];
    let text = formatter.format_run(&summaries);
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["rounds"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["rounds"][1]["stop_reason"], "satisfied");
}

// ── format_billing_report ────────────────────────────────────────────

#[test]
fn format_billing_report_pretty_includes_month_and_model() {
    let formatter = Formatter::new(OutputFormat::Pretty);
    let text = formatter.format_billing_report(&sample_billing_report());
    assert!(text.contains("2026-08"));
    assert!(text.contains("gpt-5-mini"));
}

#[test]
fn format_billing_report_json_round_trips_totals() {
    let formatter = Formatter::new(OutputFormat::Json);
    let text = formatter.format_billing_report(&sample_billing_report());
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["total_calls"], 4);
    assert_eq!(parsed["by_model"]["gpt-5-mini"]["calls"], 4);
}

// ── format_explain_unk ───────────────────────────────────────────────

#[test]
fn format_explain_unk_pretty_includes_every_field() {
    let formatter = Formatter::new(OutputFormat::Pretty);
    let text = formatter.format_explain_unk(&sample_explain_unk_rows());
    assert!(text.contains("battery_life_hours"));
    assert!(text.contains("sensor_dpi"));
    assert!(text.contains("conflicting_sources_unresolved"));
}

#[test]
fn format_explain_unk_pretty_on_no_rows_says_so() {
    let formatter = Formatter::new(OutputFormat::Pretty);
    assert_eq!(formatter.format_explain_unk(&[]), "no outstanding fields");
}

#[test]
fn format_explain_unk_json_round_trips_rows() {
    let formatter = Formatter::new(OutputFormat::Json);
    let text = formatter.format_explain_unk(&sample_explain_unk_rows());
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
    assert_eq!(parsed[0]["field"], "battery_life_hours");
}

// ── format_error ─────────────────────────────────────────────────────

#[test]
fn format_error_pretty_prefixes_with_error() {
    let formatter = Formatter::new(OutputFormat::Pretty);
    assert_eq!(formatter.format_error("boom"), "Error: boom");
}

#[test]
fn format_error_json_is_an_object_with_an_error_key() {
    let formatter = Formatter::new(OutputFormat::Json);
    let text = formatter.format_error("boom");
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["error"], "boom");
}
