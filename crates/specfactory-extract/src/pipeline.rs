// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ties the individual extraction methods to an [`EvidencePack`]: binds
//! every deterministic candidate to a snippet so it always carries at least
//! one evidence ref (`spec.md` §4.4, §4.5).

use specfactory_evidence::{bind_deterministic_candidates, rebind_dangling_ref, DeterministicCandidate, EvidencePackBuilder};
use specfactory_types::{Candidate, EvidencePack, SnippetType};

/// Admit a deterministic-candidate synthetic snippet for every deterministic
/// candidate not already covered by an existing snippet, then set each
/// candidate's `evidence_refs` to its bound snippet ID.
///
/// `spec.md` §4.5: a deterministic candidate always has a bindable snippet;
/// non-deterministic (LLM) candidates are left untouched since they already
/// carry the evidence refs the model itself cited.
pub fn bind_candidate_evidence(pack: &mut EvidencePack, candidates: &mut [Candidate]) {
    let deterministic: Vec<&Candidate> = candidates.iter().filter(|c| c.method.is_deterministic()).collect();
    let to_bind: Vec<DeterministicCandidate<'_>> = deterministic
        .iter()
        .map(|c| DeterministicCandidate { field: &c.field, value: &c.value, method: c.method.as_str(), key_path: &c.key_path })
        .collect();
    bind_deterministic_candidates(pack, &to_bind);

    for candidate in candidates.iter_mut() {
        if !candidate.method.is_deterministic() {
            continue;
        }
        if let Some(snippet_id) = rebind_dangling_ref(pack, &candidate.field, &candidate.value, candidate.method.as_str(), &candidate.key_path) {
            if !candidate.evidence_refs.contains(&snippet_id) {
                candidate.evidence_refs.push(snippet_id);
            }
        }
    }
}

/// Build a minimal evidence pack directly from a set of already-extracted
/// deterministic candidates, useful for extraction methods (JSON, DOM,
/// article, PDF) that never went through a full page snippet pass.
#[must_use]
pub fn pack_from_candidates(source_id: &str, max_evidence_chars: usize, candidates: &mut [Candidate], content_hash: &str, text_hash: &str) -> EvidencePack {
    let mut builder = EvidencePackBuilder::new(source_id, max_evidence_chars).content_hash(content_hash).text_hash(text_hash);
    for candidate in candidates.iter() {
        if !candidate.method.is_deterministic() {
            continue;
        }
        builder = builder.candidate(
            SnippetType::DeterministicCandidate,
            format!("{}: {}", candidate.field, candidate.value),
            String::new(),
            candidate.method.as_str(),
            candidate.key_path.clone(),
            vec![candidate.field.clone()],
        );
    }
    let mut pack = builder.build();
    bind_candidate_evidence(&mut pack, candidates);
    pack
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfactory_types::{CandidateBindings, CandidateMethod};

    fn empty_pack() -> EvidencePack {
        EvidencePack {
            source_id: "src-1".into(),
            snippets: vec![],
            candidate_bindings: CandidateBindings::new(),
            page_content_hash: "h1".into(),
            text_hash: "h2".into(),
        }
    }

    #[test]
    fn deterministic_candidate_gets_a_bound_snippet_ref() {
        let mut pack = empty_pack();
        let mut candidates = vec![Candidate::new("dpi", "25600", CandidateMethod::JsonLd, "offers.dpi", "src-1", vec![])];
        bind_candidate_evidence(&mut pack, &mut candidates);
        assert_eq!(candidates[0].evidence_refs.len(), 1);
        assert_eq!(pack.snippets.len(), 1);
    }

    #[test]
    fn llm_candidate_is_left_untouched() {
        let mut pack = empty_pack();
        let mut candidates = vec![Candidate::new("weight", "63 g", CandidateMethod::LlmExtract, "llm_response", "src-1", vec!["j01".into()])];
        bind_candidate_evidence(&mut pack, &mut candidates);
        assert_eq!(candidates[0].evidence_refs, vec!["j01".to_string()]);
        assert!(pack.snippets.is_empty());
    }

    #[test]
    fn two_deterministic_candidates_with_the_same_value_share_a_binding() {
        let mut pack = empty_pack();
        let mut candidates = vec![
            Candidate::new("dpi", "25600", CandidateMethod::JsonLd, "offers.dpi", "src-1", vec![]),
            Candidate::new("dpi", "25600", CandidateMethod::Microdata, "props.dpi", "src-1", vec![]),
        ];
        bind_candidate_evidence(&mut pack, &mut candidates);
        assert_eq!(pack.snippets.len(), 1);
        assert_eq!(candidates[0].evidence_refs, candidates[1].evidence_refs);
    }

    #[test]
    fn pack_from_candidates_builds_and_binds_in_one_step() {
        let mut candidates = vec![Candidate::new("weight", "63 g", CandidateMethod::SpecTable, "table[0]", "src-1", vec![])];
        let pack = pack_from_candidates("src-1", 10_000, &mut candidates, "h1", "h2");
        assert_eq!(pack.snippets.len(), 1);
        assert_eq!(candidates[0].evidence_refs.len(), 1);
    }
}
