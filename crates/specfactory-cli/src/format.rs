// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output formatting for the SpecFactory CLI: `--log-format {pretty,json}`
//! controls whether a run's rounds, a billing report, or an `explain-unk`
//! row set prints as JSON or as aligned text.

use crate::commands::{BillingReport, ExplainUnkRow};
use serde::{Deserialize, Serialize};
use specfactory_runtime::RoundSummary;
use std::fmt;
use std::str::FromStr;

/// Supported output formats for CLI display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable multi-line text.
    Pretty,
    /// Pretty-printed JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Formats SpecFactory CLI results for display.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Create a new formatter with the given output format.
    #[must_use]
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Format a run's round summaries.
    #[must_use]
    pub fn format_run(&self, summaries: &[RoundSummary]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&run_summaries_json(summaries)).unwrap_or_default(),
            OutputFormat::Pretty => format_run_pretty(summaries),
        }
    }

    /// Format a billing report.
    #[must_use]
    pub fn format_billing_report(&self, report: &BillingReport) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Pretty => format_billing_report_pretty(report),
        }
    }

    /// Format `explain-unk`'s rows.
    #[must_use]
    pub fn format_explain_unk(&self, rows: &[ExplainUnkRow]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(rows).unwrap_or_default(),
            OutputFormat::Pretty => format_explain_unk_pretty(rows),
        }
    }

    /// Format an error message.
    #[must_use]
    pub fn format_error(&self, err: &str) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({"error": err}).to_string(),
            OutputFormat::Pretty => format!("Error: {err}"),
        }
    }
}

fn run_summaries_json(summaries: &[RoundSummary]) -> serde_json::Value {
    let rounds: Vec<_> = summaries
        .iter()
        .map(|s| {
            serde_json::json!({
                "round": s.round,
                "stop_reason": s.stop_reason,
                "identity_decision": s.identity_decision,
                "quality": s.quality,
            })
        })
        .collect();
    serde_json::json!({ "rounds": rounds })
}

fn format_run_pretty(summaries: &[RoundSummary]) -> String {
    let mut lines = Vec::new();
    for summary in summaries {
        lines.push(format!(
            "round {:<3} validated={:<5} completeness={:.2} confidence={:.2} stop={}",
            summary.round,
            summary.quality.validated,
            summary.quality.completeness_required,
            summary.quality.confidence,
            summary.stop_reason.map_or_else(|| "-".to_string(), |r| format!("{r:?}")),
        ));
    }
    if lines.is_empty() {
        lines.push("no rounds ran".to_string());
    }
    lines.join("\n")
}

fn format_billing_report_pretty(report: &BillingReport) -> String {
    let mut lines = vec![format!(
        "{}: {} calls, ${:.2} total",
        report.month, report.total_calls, report.total_usd
    )];
    for (model, totals) in &report.by_model {
        lines.push(format!(
            "  {:<24} calls={:<6} prompt={:<8} completion={:<8} cost=${:.4}",
            model, totals.calls, totals.prompt_tokens, totals.completion_tokens, totals.cost_usd
        ));
    }
    lines.join("\n")
}

fn format_explain_unk_pretty(rows: &[ExplainUnkRow]) -> String {
    if rows.is_empty() {
        return "no outstanding fields".to_string();
    }
    rows.iter()
        .map(|row| format!("{:<24} {:<28} {}", row.field, format!("{:?}", row.deficit_reason), row.unknown_reason))
        .collect::<Vec<_>>()
        .join("\n")
}
