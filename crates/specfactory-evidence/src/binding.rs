// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic-candidate binding into an [`EvidencePack`].

use specfactory_types::{candidate_fingerprint, EvidencePack, Snippet, SnippetType};

/// A deterministic candidate awaiting a bindable snippet.
#[derive(Debug, Clone)]
pub struct DeterministicCandidate<'a> {
    /// Field name.
    pub field: &'a str,
    /// Normalized value.
    pub value: &'a str,
    /// Extraction method.
    pub method: &'a str,
    /// Structural path.
    pub key_path: &'a str,
}

/// For each non-unknown deterministic candidate, compute its fingerprint; if
/// no existing snippet already contains its value, emit a new
/// `deterministic_candidate` synthetic snippet and record the binding.
///
/// `spec.md` §4.5: "Downstream LLM output that fails to cite a valid snippet
/// ID can be re-bound to the deterministic snippet when its fingerprint
/// matches."
pub fn bind_deterministic_candidates(pack: &mut EvidencePack, candidates: &[DeterministicCandidate<'_>]) {
    for c in candidates {
        let fingerprint = candidate_fingerprint(c.field, c.value, c.method, c.key_path);
        if pack.candidate_bindings.contains_key(&fingerprint) {
            continue;
        }
        let normalized_value = c.value.to_lowercase();
        if let Some(existing) = pack
            .snippets
            .iter()
            .find(|s| s.normalized_text.contains(&normalized_value))
        {
            pack.candidate_bindings
                .insert(fingerprint, existing.id.clone());
            continue;
        }
        let id = format!("c{:02}", pack.candidate_bindings.len() + 1);
        let snippet = Snippet::new(
            id.clone(),
            pack.source_id.clone(),
            SnippetType::DeterministicCandidate,
            format!("{}: {}", c.field, c.value),
            String::new(),
            c.method,
            c.key_path,
            vec![c.field.to_string()],
        );
        pack.snippets.push(snippet);
        pack.candidate_bindings.insert(fingerprint, id);
    }
}

/// Re-bind a dangling snippet reference to its deterministic snippet, if the
/// candidate's fingerprint matches one already bound in the pack.
#[must_use]
pub fn rebind_dangling_ref(
    pack: &EvidencePack,
    field: &str,
    value: &str,
    method: &str,
    key_path: &str,
) -> Option<String> {
    let fingerprint = candidate_fingerprint(field, value, method, key_path);
    pack.candidate_bindings.get(&fingerprint).cloned()
}
