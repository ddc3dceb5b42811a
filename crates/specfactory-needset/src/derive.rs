// SPDX-License-Identifier: MIT OR Apache-2.0
//! Needset derivation: which fields still need work this round, and why
//! (`spec.md` §3.6, §4.10).

use crate::config::FieldPlan;
use specfactory_types::{DeficitReason, FieldValue, NeedsetRow, Provenance};
use std::collections::{BTreeMap, HashSet};

/// Classify one field's provenance into a deficit reason, or `None` if the
/// field is satisfied and should drop out of the needset.
fn deficit_reason(provenance: Option<&Provenance>, constraint_violated: bool) -> Option<DeficitReason> {
    if constraint_violated {
        return Some(DeficitReason::ConstraintViolation);
    }
    let Some(p) = provenance else {
        return Some(DeficitReason::Missing);
    };
    match &p.value {
        FieldValue::Unk { reason } => Some(match reason.as_str() {
            "below_min_evidence" => DeficitReason::BelowMinEvidence,
            "conflicting_sources_unresolved" => DeficitReason::ConflictingSources,
            _ => DeficitReason::Missing,
        }),
        _ if !p.meets_pass_target => Some(DeficitReason::BelowPassTarget),
        _ => None,
    }
}

/// Compute the per-round needset: one row per field still requiring work.
///
/// `constraint_violated_fields` names fields a cross-field constraint check
/// (`specfactory_consensus::apply_constraints`) has already flagged this
/// round; those always surface with `ConstraintViolation` regardless of
/// their own provenance state.
#[must_use]
pub fn compute_needset(
    plans: &[FieldPlan],
    provenance: &BTreeMap<String, Provenance>,
    constraint_violated_fields: &HashSet<String>,
) -> Vec<NeedsetRow> {
    plans
        .iter()
        .filter_map(|plan| {
            let reason = deficit_reason(provenance.get(&plan.field), constraint_violated_fields.contains(&plan.field))?;
            Some(NeedsetRow {
                field: plan.field.clone(),
                required_level: plan.required_level.clone(),
                availability_class: plan.availability_class,
                deficit_reason: reason,
                tier_preference: plan.tier_preference.clone(),
                min_evidence_refs: plan.min_evidence_refs,
                force_high: plan.force_high,
            })
        })
        .collect()
}
