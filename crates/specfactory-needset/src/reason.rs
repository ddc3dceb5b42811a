// SPDX-License-Identifier: MIT OR Apache-2.0
//! Availability-aware unknown-reason assignment (`spec.md` §4.10, §7).

use crate::availability::{effort_exhausted, EffortSpent};
use specfactory_types::{AvailabilityClass, DeficitReason};

/// Assign the terminal `unknown_reason` code for a field the engine has
/// given up on this run, following `spec.md` §4.10's priority:
/// identity ambiguity first, then unresolved conflicts, then
/// availability-proportional effort deciding between
/// `not_publicly_disclosed` and `not_found_after_search`.
#[must_use]
pub fn assign_unknown_reason(
    deficit: DeficitReason,
    availability: AvailabilityClass,
    effort: EffortSpent,
    identity_locked: bool,
) -> &'static str {
    if !identity_locked {
        return "identity_ambiguous";
    }
    if deficit == DeficitReason::ConflictingSources {
        return "conflicting_sources_unresolved";
    }
    if effort_exhausted(availability, effort) {
        "not_publicly_disclosed"
    } else {
        "not_found_after_search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlocked_identity_always_wins() {
        let reason = assign_unknown_reason(
            DeficitReason::Missing,
            AvailabilityClass::Expected,
            EffortSpent { rounds_attempted: 5, searches_issued: 5 },
            false,
        );
        assert_eq!(reason, "identity_ambiguous");
    }

    #[test]
    fn conflicting_sources_reason_passes_through() {
        let reason = assign_unknown_reason(
            DeficitReason::ConflictingSources,
            AvailabilityClass::Expected,
            EffortSpent::default(),
            true,
        );
        assert_eq!(reason, "conflicting_sources_unresolved");
    }

    #[test]
    fn insufficient_effort_yields_not_found_after_search() {
        let reason = assign_unknown_reason(
            DeficitReason::Missing,
            AvailabilityClass::Rare,
            EffortSpent { rounds_attempted: 1, searches_issued: 1 },
            true,
        );
        assert_eq!(reason, "not_found_after_search");
    }

    #[test]
    fn exhausted_effort_on_rare_field_yields_not_publicly_disclosed() {
        let reason = assign_unknown_reason(
            DeficitReason::Missing,
            AvailabilityClass::Rare,
            EffortSpent { rounds_attempted: 3, searches_issued: 2 },
            true,
        );
        assert_eq!(reason, "not_publicly_disclosed");
    }
}
