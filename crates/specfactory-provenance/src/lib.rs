// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Round-over-round field provenance diffing.
//!
//! Provides [`ProvenanceTracker`] for recording each round's resolved field
//! provenance and producing a [`RoundDelta`] used by the round controller's
//! stop-condition checks (`spec.md` §4.1, marginal-yield rule).

use serde::{Deserialize, Serialize};
use specfactory_types::Provenance;
use std::collections::BTreeMap;

/// How a field's provenance changed between two consecutive rounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldChangeKind {
    /// The field had no value last round and now does.
    Filled,
    /// The field was already filled and its confidence increased.
    Improved,
    /// The field was already filled and its confidence decreased.
    Regressed,
    /// The field's value and confidence are unchanged.
    Unchanged,
    /// A previously filled field reverted to `unk` (e.g. consensus lost a
    /// confirming source after a host was blocked).
    BecameUnknown,
}

/// A single field's provenance change between two rounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field name.
    pub field: String,
    /// What kind of change occurred.
    pub kind: FieldChangeKind,
    /// Confidence before this round, if the field existed last round.
    pub confidence_before: Option<f64>,
    /// Confidence after this round, if the field is known now.
    pub confidence_after: Option<f64>,
}

impl FieldChange {
    /// Signed confidence delta (`after - before`), treating a missing side
    /// as `0.0`.
    #[must_use]
    pub fn confidence_delta(&self) -> f64 {
        self.confidence_after.unwrap_or(0.0) - self.confidence_before.unwrap_or(0.0)
    }
}

/// Aggregate statistics for one round's provenance diff, matching the
/// `round_summary` shape in `spec.md` §4.1.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundDelta {
    /// Round number this delta describes (the "after" round).
    pub round: u32,
    /// Count of required fields that went from unfilled to filled.
    pub fields_gained: usize,
    /// Count of fields that reverted from filled to `unk`.
    pub fields_lost: usize,
    /// Sum of per-field confidence deltas across fields present in both rounds.
    pub confidence_delta: f64,
    /// Per-field changes, in field-name order.
    pub changes: Vec<FieldChange>,
}

impl RoundDelta {
    /// `spec.md` §4.1 marginal-yield stop condition: two consecutive rounds
    /// with zero new required fields filled and a confidence delta below
    /// `threshold`.
    #[must_use]
    pub fn is_marginal_yield(&self, threshold: f64) -> bool {
        self.fields_gained == 0 && self.confidence_delta.abs() < threshold
    }
}

/// Compare two rounds' resolved provenance maps and produce a [`RoundDelta`].
///
/// `required_fields` restricts `fields_gained`/`fields_lost` counting to the
/// fields the job requires; confidence_delta aggregates across every field
/// present in `current` regardless of required status.
#[must_use]
pub fn diff_round(
    round: u32,
    previous: &BTreeMap<String, Provenance>,
    current: &BTreeMap<String, Provenance>,
    required_fields: &[String],
) -> RoundDelta {
    let mut delta = RoundDelta {
        round,
        ..RoundDelta::default()
    };

    for (field, curr) in current {
        let prev = previous.get(field);
        let before_known = prev.is_some_and(|p| p.value.is_known());
        let after_known = curr.value.is_known();
        let confidence_before = prev.map(|p| p.confidence);
        let confidence_after = after_known.then_some(curr.confidence);

        let kind = match (before_known, after_known) {
            (false, true) => FieldChangeKind::Filled,
            (true, false) => FieldChangeKind::BecameUnknown,
            (true, true) => {
                let before = confidence_before.unwrap_or(0.0);
                if curr.confidence > before {
                    FieldChangeKind::Improved
                } else if curr.confidence < before {
                    FieldChangeKind::Regressed
                } else {
                    FieldChangeKind::Unchanged
                }
            }
            (false, false) => FieldChangeKind::Unchanged,
        };

        if required_fields.iter().any(|f| f == field) {
            match kind {
                FieldChangeKind::Filled => delta.fields_gained += 1,
                FieldChangeKind::BecameUnknown => delta.fields_lost += 1,
                _ => {}
            }
        }

        let change = FieldChange {
            field: field.clone(),
            kind,
            confidence_before,
            confidence_after,
        };
        delta.confidence_delta += change.confidence_delta();
        delta.changes.push(change);
    }

    delta
}

/// Records each round's resolved provenance snapshot and computes deltas.
#[derive(Clone, Debug, Default)]
pub struct ProvenanceTracker {
    required_fields: Vec<String>,
    snapshots: Vec<BTreeMap<String, Provenance>>,
    deltas: Vec<RoundDelta>,
}

impl ProvenanceTracker {
    /// Create a tracker scoped to `required_fields` (used for the
    /// marginal-yield `fields_gained`/`fields_lost` counters).
    #[must_use]
    pub fn new(required_fields: Vec<String>) -> Self {
        Self {
            required_fields,
            snapshots: Vec::new(),
            deltas: Vec::new(),
        }
    }

    /// Record the resolved provenance for round `round` and return its
    /// delta against the previous round (empty delta for round 0).
    pub fn record_round(
        &mut self,
        round: u32,
        snapshot: BTreeMap<String, Provenance>,
    ) -> &RoundDelta {
        let delta = match self.snapshots.last() {
            Some(prev) => diff_round(round, prev, &snapshot, &self.required_fields),
            None => diff_round(round, &BTreeMap::new(), &snapshot, &self.required_fields),
        };
        self.snapshots.push(snapshot);
        self.deltas.push(delta);
        self.deltas.last().expect("just pushed")
    }

    /// All recorded deltas in round order.
    #[must_use]
    pub fn deltas(&self) -> &[RoundDelta] {
        &self.deltas
    }

    /// `true` once the last two recorded rounds both satisfy the
    /// marginal-yield stop condition.
    #[must_use]
    pub fn marginal_yield_reached(&self, threshold: f64) -> bool {
        let len = self.deltas.len();
        if len < 2 {
            return false;
        }
        self.deltas[len - 1].is_marginal_yield(threshold)
            && self.deltas[len - 2].is_marginal_yield(threshold)
    }

    /// Whether any round has been recorded.
    #[must_use]
    pub fn has_rounds(&self) -> bool {
        !self.snapshots.is_empty()
    }
}
