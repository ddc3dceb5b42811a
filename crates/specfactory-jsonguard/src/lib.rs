// SPDX-License-Identifier: MIT OR Apache-2.0
//! Guardrails for untrusted LLM JSON output (`spec.md` §4.4, §4.9).

use serde_json::Value;
use specfactory_types::FieldValue;
use std::collections::HashSet;

/// Limits used to validate JSON payloads before they are parsed into candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonGuardLimits {
    /// Maximum allowed depth of objects/arrays.
    pub max_depth: usize,
    /// Maximum allowed UTF-8 byte size after JSON serialization.
    pub max_size_bytes: usize,
}

impl JsonGuardLimits {
    /// Constructs new JSON guard limits.
    #[must_use]
    pub const fn new(max_depth: usize, max_size_bytes: usize) -> Self {
        Self {
            max_depth,
            max_size_bytes,
        }
    }
}

/// Validates that `value` is a JSON object and does not exceed depth/size constraints.
///
/// Returns a vector of validation errors; empty means the payload passed all checks.
#[must_use]
pub fn validate_json_object(value: &Value, limits: JsonGuardLimits) -> Vec<String> {
    let mut errors = Vec::new();

    if !value.is_object() {
        errors.push("LLM output must be a JSON object".into());
        return errors;
    }

    if exceeds_depth(value, limits.max_depth) {
        errors.push(format!(
            "LLM output exceeds maximum nesting depth of {}",
            limits.max_depth
        ));
    }

    if value.to_string().len() > limits.max_size_bytes {
        let max_kb = limits.max_size_bytes / 1_000;
        if max_kb > 0 {
            errors.push(format!("LLM output exceeds maximum size of {max_kb}KB"));
        } else {
            errors.push(format!(
                "LLM output exceeds maximum size of {} bytes",
                limits.max_size_bytes
            ));
        }
    }

    errors
}

fn exceeds_depth(value: &Value, max_depth: usize) -> bool {
    if max_depth == 0 {
        return value.is_object() || value.is_array();
    }
    match value {
        Value::Object(map) => map.values().any(|v| exceeds_depth(v, max_depth - 1)),
        Value::Array(arr) => arr.iter().any(|v| exceeds_depth(v, max_depth - 1)),
        _ => false,
    }
}

/// Why an LLM-emitted candidate was dropped rather than promoted into
/// consensus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateRejection {
    /// One or more cited snippet IDs do not exist in the evidence pack.
    DanglingSnippetRef,
    /// Fewer distinct valid citations than `min_evidence_refs_required`.
    BelowMinEvidenceRefs,
    /// A scalar field received an array value with more than one element.
    ShapeMismatchScalarArray,
    /// A scalar field received an object value.
    ShapeMismatchScalarObject,
}

impl CandidateRejection {
    /// Stable reason string recorded on the candidate/field audit trail.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DanglingSnippetRef => "dangling_snippet_ref",
            Self::BelowMinEvidenceRefs => "below_min_evidence",
            Self::ShapeMismatchScalarArray => "shape_mismatch_scalar_array",
            Self::ShapeMismatchScalarObject => "shape_mismatch_scalar_object",
        }
    }
}

/// Check that every entry of `cited` exists in `valid_snippet_ids` and that
/// at least `min_required` distinct valid citations were given.
///
/// `spec.md` §4.4/§4.9: output must cite at least `min_evidence_refs_required`
/// snippet IDs that actually exist in the pack, else the candidate is
/// dropped as `dangling_snippet_ref`.
pub fn validate_evidence_refs(
    cited: &[String],
    valid_snippet_ids: &HashSet<String>,
    min_required: u32,
) -> Result<(), CandidateRejection> {
    if cited.iter().any(|id| !valid_snippet_ids.contains(id)) {
        return Err(CandidateRejection::DanglingSnippetRef);
    }
    let distinct: HashSet<&String> = cited.iter().collect();
    if (distinct.len() as u32) < min_required {
        return Err(CandidateRejection::BelowMinEvidenceRefs);
    }
    Ok(())
}

/// Normalize a raw LLM scalar-field value.
///
/// A singleton array is unwrapped to its sole element; multi-element arrays
/// and objects are rejected (`spec.md` §4.4 shape normalization).
pub fn normalize_scalar(value: &Value) -> Result<String, CandidateRejection> {
    match value {
        Value::Array(items) if items.len() == 1 => normalize_scalar(&items[0]),
        Value::Array(_) => Err(CandidateRejection::ShapeMismatchScalarArray),
        Value::Object(_) => Err(CandidateRejection::ShapeMismatchScalarObject),
        Value::String(s) => Ok(s.clone()),
        other => Ok(other.to_string()),
    }
}

/// Separators recognized when splitting a raw list-field string
/// (`spec.md` §4.4).
const LIST_SEPARATORS: &[char] = &[',', ';', '|', '/'];

/// Parse a raw list-field string: split on `, ; | /`, dedupe
/// case-insensitively preserving first-seen order, and strip tokens that are
/// [`FieldValue`]-equivalent to unknown.
#[must_use]
pub fn normalize_list(raw: &str) -> Vec<String> {
    let mut seen_lower = HashSet::new();
    let mut out = Vec::new();
    for part in raw.split(LIST_SEPARATORS) {
        let trimmed = part.trim();
        let lower = trimmed.to_lowercase();
        if trimmed.is_empty() || FieldValue::is_unknown_token(&lower) {
            continue;
        }
        if seen_lower.insert(lower) {
            out.push(trimmed.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_objects() {
        let errors =
            validate_json_object(&serde_json::json!([1, 2, 3]), JsonGuardLimits::new(10, 10));
        assert_eq!(errors, vec!["LLM output must be a JSON object"]);
    }

    #[test]
    fn rejects_nested_structures_that_exceed_depth() {
        let value = serde_json::json!({"a": {"b": {"c": 1}}});
        let errors = validate_json_object(&value, JsonGuardLimits::new(2, 1_000_000));
        assert!(errors.iter().any(|e| e.contains("maximum nesting depth")));
    }

    #[test]
    fn rejects_payloads_larger_than_limit() {
        let value = serde_json::json!({"data": "1234567890"});
        let errors = validate_json_object(&value, JsonGuardLimits::new(10, 5));
        assert!(errors.iter().any(|e| e.contains("maximum size")));
    }

    #[test]
    fn accepts_payloads_within_limits() {
        let value = serde_json::json!({"key": [1, 2, 3]});
        let errors = validate_json_object(&value, JsonGuardLimits::new(10, 1_000_000));
        assert!(errors.is_empty());
    }

    #[test]
    fn dangling_ref_is_rejected() {
        let valid = HashSet::from(["a01".to_string(), "a02".to_string()]);
        let err = validate_evidence_refs(&["z99".to_string()], &valid, 1).unwrap_err();
        assert_eq!(err, CandidateRejection::DanglingSnippetRef);
    }

    #[test]
    fn below_min_evidence_refs_is_rejected() {
        let valid = HashSet::from(["a01".to_string()]);
        let err = validate_evidence_refs(&["a01".to_string()], &valid, 2).unwrap_err();
        assert_eq!(err, CandidateRejection::BelowMinEvidenceRefs);
    }

    #[test]
    fn valid_refs_pass() {
        let valid = HashSet::from(["a01".to_string(), "a02".to_string()]);
        assert!(validate_evidence_refs(
            &["a01".to_string(), "a02".to_string()],
            &valid,
            2
        )
        .is_ok());
    }

    #[test]
    fn duplicate_refs_count_once_toward_min_required() {
        let valid = HashSet::from(["a01".to_string()]);
        let err =
            validate_evidence_refs(&["a01".to_string(), "a01".to_string()], &valid, 2).unwrap_err();
        assert_eq!(err, CandidateRejection::BelowMinEvidenceRefs);
    }

    #[test]
    fn normalize_scalar_unwraps_singleton_array() {
        let v = serde_json::json!(["63 g"]);
        assert_eq!(normalize_scalar(&v).unwrap(), "63 g");
    }

    #[test]
    fn normalize_scalar_rejects_multi_element_array() {
        let v = serde_json::json!(["a", "b"]);
        assert_eq!(
            normalize_scalar(&v).unwrap_err(),
            CandidateRejection::ShapeMismatchScalarArray
        );
    }

    #[test]
    fn normalize_scalar_rejects_object() {
        let v = serde_json::json!({"a": 1});
        assert_eq!(
            normalize_scalar(&v).unwrap_err(),
            CandidateRejection::ShapeMismatchScalarObject
        );
    }

    #[test]
    fn normalize_list_splits_dedupes_and_preserves_order() {
        let parsed = normalize_list("Wireless, wired | wireless; Bluetooth/USB-C");
        assert_eq!(parsed, vec!["Wireless", "wired", "Bluetooth", "USB-C"]);
    }

    #[test]
    fn normalize_list_strips_unknown_tokens() {
        let parsed = normalize_list("wireless, n/a, , unknown");
        assert_eq!(parsed, vec!["wireless"]);
    }
}
