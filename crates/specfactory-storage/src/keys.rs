// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storage key layout (`spec.md` §6.2). Billing-ledger keys live in
//! `specfactory_llm::ledger` since they're only ever written through the
//! cost ledger; this module covers the remaining four key families.

/// One stage of a per-run artifact tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Raw fetched pages.
    Raw,
    /// Extracted candidates.
    Extracted,
    /// Consensus-normalized field values.
    Normalized,
    /// Per-field provenance.
    Provenance,
    /// Run logs.
    Logs,
    /// Round/run summaries.
    Summary,
}

impl RunStage {
    fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Extracted => "extracted",
            Self::Normalized => "normalized",
            Self::Provenance => "provenance",
            Self::Logs => "logs",
            Self::Summary => "summary",
        }
    }
}

/// Key for a product job's input JSON: `{input_prefix}/{category}/products/{product_id}.json`.
#[must_use]
pub fn input_key(input_prefix: &str, category: &str, product_id: &str) -> String {
    format!("{input_prefix}/{category}/products/{product_id}.json")
}

/// Key for one artifact within a run: `{output_prefix}/{category}/{product_id}/runs/{run_id}/{stage}/{filename}`.
#[must_use]
pub fn run_artifact_key(output_prefix: &str, category: &str, product_id: &str, run_id: &str, stage: RunStage, filename: &str) -> String {
    format!("{output_prefix}/{category}/{product_id}/runs/{run_id}/{}/{filename}", stage.as_str())
}

/// Key for a latest-pointer artifact: `{output_prefix}/{category}/{product_id}/latest/{filename}`.
#[must_use]
pub fn latest_key(output_prefix: &str, category: &str, product_id: &str, filename: &str) -> String {
    format!("{output_prefix}/{category}/{product_id}/latest/{filename}")
}

/// Key for one source's evidence pack, written alongside its extracted
/// candidates for the same run.
#[must_use]
pub fn evidence_pack_key(output_prefix: &str, category: &str, product_id: &str, run_id: &str, source_id: &str) -> String {
    format!(
        "{output_prefix}/{category}/{product_id}/runs/{run_id}/extracted/evidence/{source_id}.json"
    )
}
