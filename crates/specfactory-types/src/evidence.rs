//! Evidence Pack — the bounded, hashed snippet collection for one source.
//!
//! See `spec.md` §3.4 and §4.5.

use crate::fingerprint::sha256_hex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of evidence a snippet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SnippetType {
    /// An HTML `<table>`.
    Table,
    /// A `<dl>` or prose definition pair.
    Definition,
    /// An inline `key: value` row.
    Kv,
    /// A heuristic text window around a target-field token.
    Window,
    /// Freeform text (article body, spec-section heading).
    Text,
    /// Raw JSON (network response, embedded state).
    Json,
    /// A JSON-LD `Product` node.
    JsonLdProduct,
    /// PDF-extracted text.
    Pdf,
    /// Synthetic `"field: value"` snippet guaranteeing a candidate binding.
    DeterministicCandidate,
}

/// One unit of evidence in a pack, with a stable slot ID and a hash of its
/// normalized text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Snippet {
    /// Stable slot ID within the pack (e.g. `t01`, `j03`, `c05`).
    pub id: String,
    /// Owning source.
    pub source_id: String,
    /// Evidence kind.
    #[serde(rename = "type")]
    pub snippet_type: SnippetType,
    /// Truncated display text.
    pub text: String,
    /// Whitespace-collapsed, lowercased text used for hashing/dedup.
    pub normalized_text: String,
    /// `sha256(normalized_text)`.
    pub snippet_hash: String,
    /// Page URL this snippet came from.
    pub url: String,
    /// Extraction method that produced this snippet.
    pub extraction_method: String,
    /// Structural path (JSON pointer, table cell, DOM selector).
    pub key_path: String,
    /// Field names this snippet is believed relevant to.
    pub field_hints: Vec<String>,
}

impl Snippet {
    /// Normalize raw text (trim, collapse internal whitespace, lowercase)
    /// and hash it, producing a snippet ready for pack insertion.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        snippet_type: SnippetType,
        text: impl Into<String>,
        url: impl Into<String>,
        extraction_method: impl Into<String>,
        key_path: impl Into<String>,
        field_hints: Vec<String>,
    ) -> Self {
        let text = text.into();
        let normalized_text = normalize_text(&text);
        let snippet_hash = sha256_hex(&normalized_text);
        Self {
            id: id.into(),
            source_id: source_id.into(),
            snippet_type,
            text,
            normalized_text,
            snippet_hash,
            url: url.into(),
            extraction_method: extraction_method.into(),
            key_path: key_path.into(),
            field_hints,
        }
    }
}

/// Collapse runs of whitespace to single spaces and lowercase, matching the
/// normalization `spec.md` §4.5 and §8 require for stable hashing.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Maps a deterministic candidate's fingerprint to the snippet that backs it.
pub type CandidateBindings = BTreeMap<String, String>;

/// The bounded set of snippets distilled from one source.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EvidencePack {
    /// Owning source.
    pub source_id: String,
    /// Snippets, in insertion priority order.
    pub snippets: Vec<Snippet>,
    /// `fingerprint → snippet_id` for every bound deterministic candidate.
    pub candidate_bindings: CandidateBindings,
    /// SHA-256 of the raw page bytes (bit-exact page identity).
    pub page_content_hash: String,
    /// SHA-256 of the extracted plain text.
    pub text_hash: String,
}

impl EvidencePack {
    /// Total character count across all snippet `text` fields, checked
    /// against `max_evidence_chars` while building (`spec.md` §3.4).
    #[must_use]
    pub fn total_chars(&self) -> usize {
        self.snippets.iter().map(|s| s.text.len()).sum()
    }

    /// `true` if every snippet ID is unique within the pack, an invariant
    /// required by `spec.md` §3.4 and tested in §8.
    #[must_use]
    pub fn has_unique_snippet_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.snippets.len());
        self.snippets.iter().all(|s| seen.insert(s.id.as_str()))
    }

    /// Look up a snippet by ID.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }
}
