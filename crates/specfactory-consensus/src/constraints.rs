// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cross-field constraint evaluation, applied after per-field consensus
//! (`spec.md` §4.6 "Constraints").

use specfactory_types::{FieldValue, Provenance};
use std::collections::BTreeMap;

/// How two fields' resolved values relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `field`'s value must be `<=` `other_field`'s value.
    LessOrEqual,
    /// `field`'s value must be `>=` `other_field`'s value.
    GreaterOrEqual,
}

/// A cross-field invariant evaluated after consensus, e.g.
/// `sensor_date <= release_date`.
#[derive(Debug, Clone)]
pub struct CrossFieldConstraint {
    /// The field flagged with `constraint_conflict` when this constraint is
    /// violated ("the newer field" per `spec.md` §4.6).
    pub field: String,
    /// The field `field` is compared against.
    pub other_field: String,
    /// Relation `field` must satisfy against `other_field`.
    pub kind: ConstraintKind,
}

/// Compare two resolved values numerically, falling back to lexicographic
/// comparison (correct for ISO-8601 dates and plain strings alike).
fn compare_values(a: &str, b: &str) -> Option<std::cmp::Ordering> {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y),
        _ => Some(a.cmp(b)),
    }
}

fn scalar_text(value: &FieldValue) -> Option<&str> {
    match value {
        FieldValue::Scalar { value } => Some(value.as_str()),
        _ => None,
    }
}

/// Evaluate every constraint against the round's resolved provenance,
/// flipping `meets_pass_target` to `false` and recording `constraint_conflict`
/// on the dependent field for every violation. Returns the field names
/// flagged.
pub fn apply_constraints(
    provenance: &mut BTreeMap<String, Provenance>,
    constraints: &[CrossFieldConstraint],
) -> Vec<String> {
    let mut violated = Vec::new();
    for constraint in constraints {
        let (Some(a), Some(b)) = (
            provenance.get(&constraint.field).and_then(|p| scalar_text(&p.value)).map(String::from),
            provenance
                .get(&constraint.other_field)
                .and_then(|p| scalar_text(&p.value))
                .map(String::from),
        ) else {
            continue;
        };
        let Some(ordering) = compare_values(&a, &b) else {
            continue;
        };
        let satisfied = match constraint.kind {
            ConstraintKind::LessOrEqual => ordering.is_le(),
            ConstraintKind::GreaterOrEqual => ordering.is_ge(),
        };
        if !satisfied
            && let Some(p) = provenance.get_mut(&constraint.field)
        {
            p.meets_pass_target = false;
            p.reasoning.reasons.push("constraint_conflict".to_string());
            violated.push(constraint.field.clone());
        }
    }
    violated
}
