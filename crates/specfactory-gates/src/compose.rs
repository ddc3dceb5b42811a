// SPDX-License-Identifier: MIT OR Apache-2.0
//! Quality gate — validates the final normalized record against targets
//! (`spec.md` §4.8).

use serde::{Deserialize, Serialize};
use specfactory_types::{Provenance, Requirements};
use std::collections::BTreeMap;

/// A single reason the quality gate withheld `validated = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailure {
    /// `completeness_required < target_completeness`.
    CompletenessBelowTarget,
    /// Aggregate `confidence < target_confidence`.
    ConfidenceBelowTarget,
    /// A required field did not meet its pass target.
    CriticalFieldBelowPassTarget(String),
    /// A major anchor conflict was detected this round.
    AnchorConflict,
    /// `identity_confidence < 0.99`.
    IdentityNotLocked,
}

impl ValidationFailure {
    /// Stable machine-readable code for this failure, suitable for
    /// `validated_reason` enumeration.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::CompletenessBelowTarget => "completeness_below_target".to_string(),
            Self::ConfidenceBelowTarget => "confidence_below_target".to_string(),
            Self::CriticalFieldBelowPassTarget(field) => {
                format!("critical_field_below_pass_target:{field}")
            }
            Self::AnchorConflict => "anchor_conflict".to_string(),
            Self::IdentityNotLocked => "identity_not_locked".to_string(),
        }
    }
}

/// Outcome of evaluating a product's resolved fields against its
/// [`Requirements`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityGateReport {
    /// `filled_required_count / required_count`.
    pub completeness_required: f64,
    /// `filled_non_editorial / total_non_editorial`.
    pub coverage_overall: f64,
    /// Mean confidence over filled fields.
    pub confidence: f64,
    /// `true` iff every gate condition passed.
    pub validated: bool,
    /// Failure codes when `validated` is `false`.
    pub validated_reasons: Vec<ValidationFailure>,
}

/// Evaluate the quality gate for a product's current field provenance.
///
/// `non_editorial_fields` is the category's full non-editorial field list,
/// used only for the informational `coverage_overall` metric — it does not
/// gate `validated`.
#[must_use]
pub fn evaluate_quality_gate(
    provenance: &BTreeMap<String, Provenance>,
    requirements: &Requirements,
    non_editorial_fields: &[String],
    identity_confidence: f64,
    anchor_conflict: bool,
) -> QualityGateReport {
    let required_count = requirements.required_fields.len();
    let filled_required = requirements
        .required_fields
        .iter()
        .filter(|f| provenance.get(*f).is_some_and(|p| p.value.is_known()))
        .count();
    let completeness_required = if required_count == 0 {
        1.0
    } else {
        filled_required as f64 / required_count as f64
    };

    let total_non_editorial = non_editorial_fields.len();
    let filled_non_editorial = non_editorial_fields
        .iter()
        .filter(|f| provenance.get(*f).is_some_and(|p| p.value.is_known()))
        .count();
    let coverage_overall = if total_non_editorial == 0 {
        1.0
    } else {
        filled_non_editorial as f64 / total_non_editorial as f64
    };

    let filled_confidences: Vec<f64> = provenance
        .values()
        .filter(|p| p.value.is_known())
        .map(|p| p.confidence)
        .collect();
    let confidence = if filled_confidences.is_empty() {
        0.0
    } else {
        filled_confidences.iter().sum::<f64>() / filled_confidences.len() as f64
    };

    let mut reasons = Vec::new();
    if completeness_required < requirements.target_completeness {
        reasons.push(ValidationFailure::CompletenessBelowTarget);
    }
    if confidence < requirements.target_confidence {
        reasons.push(ValidationFailure::ConfidenceBelowTarget);
    }
    for field in &requirements.required_fields {
        if provenance.get(field).is_some_and(|p| !p.meets_pass_target) {
            reasons.push(ValidationFailure::CriticalFieldBelowPassTarget(field.clone()));
        }
    }
    if anchor_conflict {
        reasons.push(ValidationFailure::AnchorConflict);
    }
    if identity_confidence < 0.99 {
        reasons.push(ValidationFailure::IdentityNotLocked);
    }

    QualityGateReport {
        completeness_required,
        coverage_overall,
        confidence,
        validated: reasons.is_empty(),
        validated_reasons: reasons,
    }
}
