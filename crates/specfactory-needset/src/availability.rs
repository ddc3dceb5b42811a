// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-field availability model driving effort allocation and
//! unknown-reason labeling (`spec.md` §4.10, GLOSSARY "availability_class").

use specfactory_types::AvailabilityClass;

/// Effort already spent chasing one field this run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffortSpent {
    /// Distinct rounds in which this field appeared in the needset.
    pub rounds_attempted: u32,
    /// Search queries issued specifically targeting this field.
    pub searches_issued: u32,
}

/// Rounds of dedicated effort required before `not_publicly_disclosed`
/// becomes a credible terminal reason, by availability class. Rarer fields
/// require proportionally more effort before the engine gives up on
/// "the manufacturer simply doesn't publish this."
#[must_use]
pub fn required_effort_rounds(class: AvailabilityClass) -> u32 {
    match class {
        AvailabilityClass::Expected => 1,
        AvailabilityClass::Sometimes => 2,
        AvailabilityClass::Rare => 3,
    }
}

/// `true` once `effort` clears the availability-proportional threshold for
/// `class` (`spec.md` §4.10: "`not_publicly_disclosed` only after
/// availability-proportional effort has been spent").
#[must_use]
pub fn effort_exhausted(class: AvailabilityClass, effort: EffortSpent) -> bool {
    effort.rounds_attempted >= required_effort_rounds(class) && effort.searches_issued > 0
}
