// SPDX-License-Identifier: MIT OR Apache-2.0
//! Network JSON and embedded-state extraction: field values read out of
//! already-parsed JSON via configured pointer paths (`spec.md` §4.4 #1-2).

use serde_json::Value;
use specfactory_types::{Candidate, CandidateMethod};
use std::collections::BTreeMap;

/// For each field, the JSON pointers (RFC 6901) to try in order; the first
/// pointer that resolves to a non-null, non-empty value wins.
pub type FieldPointerMap = BTreeMap<String, Vec<String>>;

/// Flatten a resolved JSON value into the raw string a [`Candidate`] carries.
///
/// A singleton array is unwrapped; arrays of scalars are joined with `, `
/// ready for `specfactory_jsonguard::normalize_list` downstream; objects
/// have no well-defined scalar/list rendering and are skipped.
fn flatten_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) if items.len() == 1 => flatten_scalar(&items[0]),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(flatten_scalar).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) => None,
    }
}

/// Walk `payload` for each configured field pointer and emit a candidate for
/// the first pointer that resolves to a non-empty scalar/list.
///
/// `method` should be [`CandidateMethod::NetworkJson`] or
/// [`CandidateMethod::EmbeddedState`] depending on the payload's origin;
/// both carry a fixed confidence base per `spec.md` §4.4 and need no
/// per-candidate override.
#[must_use]
pub fn extract_json_candidates(
    payload: &Value,
    field_pointers: &FieldPointerMap,
    method: CandidateMethod,
    source_id: &str,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for (field, pointers) in field_pointers {
        for pointer in pointers {
            let Some(resolved) = payload.pointer(pointer) else {
                continue;
            };
            let Some(value) = flatten_scalar(resolved) else {
                continue;
            };
            candidates.push(Candidate::new(
                field.clone(),
                value,
                method,
                pointer.clone(),
                source_id,
                vec![],
            ));
            break;
        }
    }
    candidates
}
