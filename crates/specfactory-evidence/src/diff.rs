// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field-level diffing between a baseline extraction and a verification-mode
//! re-run (`spec.md` §4.9 "Verification mode").

use serde::Serialize;
use std::collections::BTreeMap;

/// One field's value before and after a verification re-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDelta {
    /// Field name.
    pub field: String,
    /// Value produced by the original (baseline) extraction run.
    pub baseline: Option<String>,
    /// Value produced by the higher-tier verification re-run.
    pub verification: Option<String>,
}

impl FieldDelta {
    /// `true` if the verification run disagreed with the baseline.
    #[must_use]
    pub fn disagrees(&self) -> bool {
        self.baseline != self.verification
    }
}

/// The recorded outcome of one verification-mode sampling pass.
///
/// `spec.md` §4.9: re-running extraction with a higher-tier model on the
/// same pack "records a verification delta... without affecting that run's
/// output" — the delta is written to a report key, never merged back into
/// consensus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationDelta {
    /// Per-field comparisons, in field-name order.
    pub fields: Vec<FieldDelta>,
}

impl VerificationDelta {
    /// Fields where the verification run disagreed with the baseline.
    #[must_use]
    pub fn disagreements(&self) -> Vec<&FieldDelta> {
        self.fields.iter().filter(|f| f.disagrees()).collect()
    }

    /// Fraction of compared fields that disagreed, `0.0` when no fields were compared.
    #[must_use]
    pub fn disagreement_rate(&self) -> f64 {
        if self.fields.is_empty() {
            return 0.0;
        }
        self.disagreements().len() as f64 / self.fields.len() as f64
    }
}

/// Compare a baseline and a verification-run field-value map and produce a
/// [`VerificationDelta`] covering the union of both key sets.
#[must_use]
pub fn diff_field_values(
    baseline: &BTreeMap<String, String>,
    verification: &BTreeMap<String, String>,
) -> VerificationDelta {
    let mut fields: Vec<String> = baseline.keys().chain(verification.keys()).cloned().collect();
    fields.sort();
    fields.dedup();

    let deltas = fields
        .into_iter()
        .map(|field| {
            let baseline_value = baseline.get(&field).cloned();
            let verification_value = verification.get(&field).cloned();
            FieldDelta {
                field,
                baseline: baseline_value,
                verification: verification_value,
            }
        })
        .collect();

    VerificationDelta { fields: deltas }
}
