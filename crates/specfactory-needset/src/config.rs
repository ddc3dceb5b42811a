// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-field configuration the needset derivation reads from category rules.

use serde::{Deserialize, Serialize};
use specfactory_types::{AvailabilityClass, Tier};

/// Category-level configuration for one field, independent of the
/// consensus engine's scoring rule (`specfactory_consensus::FieldRule`) —
/// the needset only needs the subset that drives effort allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPlan {
    /// Field name.
    pub field: String,
    /// `"required"` / `"expected"` / `"instrumented_only"`.
    pub required_level: String,
    /// Historic fill-rate class.
    pub availability_class: AvailabilityClass,
    /// Tiers to prioritize next round, in preference order.
    pub tier_preference: Vec<Tier>,
    /// Minimum distinct evidence refs required to resolve this field.
    pub min_evidence_refs: u32,
    /// `true` if this field always escalates to the high-tier model ladder.
    pub force_high: bool,
}

impl FieldPlan {
    /// A minimal plan for fields without explicit category-level tuning:
    /// expected availability, manufacturer-then-lab preference.
    #[must_use]
    pub fn default_for(field: impl Into<String>, required_level: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required_level: required_level.into(),
            availability_class: AvailabilityClass::Sometimes,
            tier_preference: vec![Tier::Manufacturer, Tier::LabDatabase, Tier::Retailer],
            min_evidence_refs: 1,
            force_high: false,
        }
    }
}
