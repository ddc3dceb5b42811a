// SPDX-License-Identifier: MIT OR Apache-2.0
//! Last-resort LLM extraction (`spec.md` §4.4 #7, §4.9): candidates are only
//! promoted once every cited snippet ID exists in the pack and the route's
//! minimum distinct-citation count is met.

use serde_json::Value;
use specfactory_jsonguard::{normalize_list, normalize_scalar, validate_evidence_refs, CandidateRejection};
use specfactory_types::{Candidate, CandidateMethod, FieldShape, FieldValue};
use std::collections::HashSet;
use tracing::warn;

/// One field entry an LLM extraction call emitted, parsed out of its JSON
/// response before shape validation.
#[derive(Debug, Clone)]
pub struct LlmFieldEmission {
    /// Field name.
    pub field: String,
    /// Declared shape for this field in the category rule store.
    pub shape: FieldShape,
    /// Raw emitted value.
    pub value: Value,
    /// Snippet IDs the model cited as support.
    pub evidence_refs: Vec<String>,
}

/// Validate and convert one LLM field emission into a candidate.
///
/// Returns `Ok(None)` when the emitted value is an unknown-equivalent
/// token (never actionable per `spec.md` §3.3) rather than treating it as a
/// rejection needing an audit trail entry.
pub fn extract_llm_candidate(
    emission: &LlmFieldEmission,
    valid_snippet_ids: &HashSet<String>,
    min_evidence_refs_required: u32,
    source_id: &str,
) -> Result<Option<Candidate>, CandidateRejection> {
    validate_evidence_refs(&emission.evidence_refs, valid_snippet_ids, min_evidence_refs_required)?;

    let raw_value = match emission.shape {
        FieldShape::Scalar | FieldShape::Component => normalize_scalar(&emission.value)?,
        FieldShape::List => {
            let Some(raw) = emission.value.as_str() else {
                return Err(CandidateRejection::ShapeMismatchScalarObject);
            };
            normalize_list(raw).join(", ")
        }
    };

    if FieldValue::is_unknown_token(raw_value.trim().to_lowercase().as_str()) {
        return Ok(None);
    }

    Ok(Some(Candidate::new(
        emission.field.clone(),
        raw_value,
        CandidateMethod::LlmExtract,
        "llm_response".to_string(),
        source_id,
        emission.evidence_refs.clone(),
    )))
}

/// Validate and convert every emission, logging (but not failing the batch
/// on) individual rejections.
#[must_use]
pub fn extract_llm_candidates(
    emissions: &[LlmFieldEmission],
    valid_snippet_ids: &HashSet<String>,
    min_evidence_refs_required: u32,
    source_id: &str,
) -> Vec<Candidate> {
    emissions
        .iter()
        .filter_map(
            |emission| match extract_llm_candidate(emission, valid_snippet_ids, min_evidence_refs_required, source_id) {
                Ok(candidate) => candidate,
                Err(reason) => {
                    warn!(field = %emission.field, reason = reason.as_str(), "llm candidate rejected");
                    None
                }
            },
        )
        .collect()
}
