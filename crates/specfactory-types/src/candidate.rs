//! A single (field, value) extraction from one source. See `spec.md` §3.3.

use crate::fingerprint::candidate_fingerprint;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Extraction method a candidate was produced by, ordered by confidence base
/// per `spec.md` §4.4 (highest first). The numeric bases live alongside the
/// variants so scoring code has one source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CandidateMethod {
    /// Captured XHR/GraphQL network JSON. Base confidence 0.96.
    NetworkJson,
    /// Framework hydration payload. Base confidence 0.93.
    EmbeddedState,
    /// Vendor/marketplace adapter API response. Base confidence 0.93.
    AdapterApi,
    /// JSON-LD structured data. Base confidence 0.90.
    JsonLd,
    /// Microdata structured data. Base confidence 0.88.
    Microdata,
    /// `<table>` / spec-table DOM extraction. Base confidence 0.85.
    SpecTable,
    /// PDF table extraction. Base confidence 0.82.
    PdfTable,
    /// PDF key-value extraction. Base confidence 0.78.
    PdfKv,
    /// Readability-style article window extraction. Base confidence 0.70.
    ArticleWindow,
    /// Last-resort LLM extraction. Base confidence 0.60.
    LlmExtract,
    /// Helper-files database row; supportive only, cannot alone meet
    /// pass-target for critical fields.
    HelperSupportive,
}

impl CandidateMethod {
    /// Confidence base per `spec.md` §4.4's ordered priority list.
    #[must_use]
    pub fn confidence_base(self) -> f64 {
        match self {
            Self::NetworkJson => 0.96,
            Self::EmbeddedState | Self::AdapterApi => 0.93,
            Self::JsonLd => 0.90,
            Self::Microdata => 0.88,
            Self::SpecTable => 0.85,
            Self::PdfTable => 0.82,
            Self::PdfKv => 0.78,
            Self::ArticleWindow => 0.70,
            Self::LlmExtract => 0.60,
            Self::HelperSupportive => 0.45,
        }
    }

    /// `true` for methods that are deterministic (non-LLM); used by the
    /// evidence pack builder to decide which candidates need a synthetic
    /// "deterministic candidate" snippet (`spec.md` §4.5).
    #[must_use]
    pub fn is_deterministic(self) -> bool {
        !matches!(self, Self::LlmExtract)
    }

    /// Stable lowercase-snake token used in fingerprints and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NetworkJson => "network_json",
            Self::EmbeddedState => "embedded_state",
            Self::AdapterApi => "adapter_api",
            Self::JsonLd => "json_ld",
            Self::Microdata => "microdata",
            Self::SpecTable => "spec_table",
            Self::PdfTable => "pdf_table",
            Self::PdfKv => "pdf_kv",
            Self::ArticleWindow => "article_window",
            Self::LlmExtract => "llm_extract",
            Self::HelperSupportive => "helper_supportive",
        }
    }
}

/// A single (field, value) extraction from one source.
///
/// `candidate_id` is a deterministic fingerprint (`spec.md` §3.3), stable
/// across runs for identical observations. A candidate whose value is an
/// unknown-equivalent token is never actionable — callers should filter
/// those out before constructing a `Candidate` and represent them with
/// [`crate::FieldValue::Unk`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    /// Deterministic fingerprint of `(field, normalized value, method, key_path)`.
    pub candidate_id: String,
    /// Field name this candidate targets.
    pub field: String,
    /// Raw extracted value (pre-normalization; normalization happens in
    /// `specfactory-consensus`).
    pub value: String,
    /// Extraction method.
    pub method: CandidateMethod,
    /// Path into the source structure this value came from (e.g. a JSON
    /// pointer, table cell address, or DOM selector).
    pub key_path: String,
    /// Confidence base for this method, copied at construction time so
    /// downstream consumers don't need to re-derive it.
    pub confidence_base: f64,
    /// Snippet IDs in the owning evidence pack that support this value.
    pub evidence_refs: Vec<String>,
    /// Source this candidate was extracted from.
    pub source_id: String,
}

impl Candidate {
    /// Build a candidate, computing `candidate_id` and `confidence_base`
    /// from the given method.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        value: impl Into<String>,
        method: CandidateMethod,
        key_path: impl Into<String>,
        source_id: impl Into<String>,
        evidence_refs: Vec<String>,
    ) -> Self {
        let field = field.into();
        let value = value.into();
        let key_path = key_path.into();
        let normalized = value.trim().to_lowercase();
        let candidate_id =
            candidate_fingerprint(&field, &normalized, method.as_str(), &key_path);
        Self {
            candidate_id,
            field,
            value,
            method,
            key_path,
            confidence_base: method.confidence_base(),
            evidence_refs,
            source_id: source_id.into(),
        }
    }
}
