// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fluent builder for constructing [`EvidencePack`]s.

use specfactory_types::{CandidateBindings, EvidencePack, Snippet, SnippetType};

/// Priority order snippets are admitted in until `max_evidence_chars` is
/// reached (`spec.md` §4.5). Earlier entries are selected first regardless
/// of insertion order into the builder.
const PRIORITY_ORDER: &[SnippetType] = &[
    SnippetType::Definition,
    SnippetType::Kv,
    SnippetType::Window,
    SnippetType::Table,
    SnippetType::Text,
    SnippetType::Json,
    SnippetType::JsonLdProduct,
    SnippetType::Pdf,
    SnippetType::DeterministicCandidate,
];

fn priority_rank(t: SnippetType) -> usize {
    PRIORITY_ORDER.iter().position(|p| *p == t).unwrap_or(PRIORITY_ORDER.len())
}

/// Stable slot-ID prefix per snippet kind, matching the `t01`/`j03`/`c05`
/// convention in `spec.md` §3.4.
fn id_prefix(t: SnippetType) -> &'static str {
    match t {
        SnippetType::Table => "t",
        SnippetType::Definition => "d",
        SnippetType::Kv => "k",
        SnippetType::Window => "w",
        SnippetType::Text => "x",
        SnippetType::Json => "j",
        SnippetType::JsonLdProduct => "l",
        SnippetType::Pdf => "p",
        SnippetType::DeterministicCandidate => "c",
    }
}

/// Builds an [`EvidencePack`] from a candidate snippet pool, admitting
/// snippets in priority order until `max_evidence_chars` is reached.
///
/// # Examples
///
/// ```
/// use specfactory_evidence::EvidencePackBuilder;
/// use specfactory_types::SnippetType;
///
/// let pack = EvidencePackBuilder::new("src-1", 1_000)
///     .candidate(SnippetType::Kv, "Weight: 63 g", "https://x", "static_dom", "kv[0]", vec!["weight".into()])
///     .content_hash("h1")
///     .text_hash("h2")
///     .build();
/// assert_eq!(pack.snippets.len(), 1);
/// ```
pub struct EvidencePackBuilder {
    source_id: String,
    max_chars: usize,
    candidates: Vec<(SnippetType, String, String, String, String, Vec<String>)>,
    content_hash: String,
    text_hash: String,
}

impl EvidencePackBuilder {
    /// Start building a pack for `source_id`, capped at `max_chars` total
    /// snippet text.
    #[must_use]
    pub fn new(source_id: impl Into<String>, max_chars: usize) -> Self {
        Self {
            source_id: source_id.into(),
            max_chars,
            candidates: Vec::new(),
            content_hash: String::new(),
            text_hash: String::new(),
        }
    }

    /// Queue a candidate snippet for admission.
    #[must_use]
    pub fn candidate(
        mut self,
        snippet_type: SnippetType,
        text: impl Into<String>,
        url: impl Into<String>,
        extraction_method: impl Into<String>,
        key_path: impl Into<String>,
        field_hints: Vec<String>,
    ) -> Self {
        self.candidates.push((
            snippet_type,
            text.into(),
            url.into(),
            extraction_method.into(),
            key_path.into(),
            field_hints,
        ));
        self
    }

    /// Set the SHA-256 of the raw page bytes.
    #[must_use]
    pub fn content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = hash.into();
        self
    }

    /// Set the SHA-256 of the extracted plain text.
    #[must_use]
    pub fn text_hash(mut self, hash: impl Into<String>) -> Self {
        self.text_hash = hash.into();
        self
    }

    /// Admit candidates in priority order until `max_chars` is reached and
    /// produce the final [`EvidencePack`].
    #[must_use]
    pub fn build(mut self) -> EvidencePack {
        self.candidates
            .sort_by_key(|(t, ..)| priority_rank(*t));

        let mut snippets = Vec::new();
        let mut total_chars = 0usize;
        let mut counters = std::collections::BTreeMap::<&'static str, u32>::new();

        for (snippet_type, text, url, extraction_method, key_path, field_hints) in self.candidates
        {
            if total_chars + text.len() > self.max_chars {
                continue;
            }
            let prefix = id_prefix(snippet_type);
            let n = counters.entry(prefix).or_insert(0);
            *n += 1;
            let id = format!("{prefix}{n:02}");
            total_chars += text.len();
            snippets.push(Snippet::new(
                id,
                self.source_id.clone(),
                snippet_type,
                text,
                url,
                extraction_method,
                key_path,
                field_hints,
            ));
        }

        EvidencePack {
            source_id: self.source_id,
            snippets,
            candidate_bindings: CandidateBindings::new(),
            page_content_hash: self.content_hash,
            text_hash: self.text_hash,
        }
    }
}
