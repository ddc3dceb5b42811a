// SPDX-License-Identifier: MIT OR Apache-2.0
//! Audit trail of per-round gate decisions.

use chrono::{DateTime, Utc};

use crate::compose::QualityGateReport;
use crate::IdentityGateDecision;

/// One recorded round's gate outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct GateAuditEntry {
    /// Round number this entry describes.
    pub round: u32,
    /// Wall-clock time the decision was recorded.
    pub timestamp: DateTime<Utc>,
    /// Identity gate decision for this round.
    pub identity_decision: IdentityGateDecision,
    /// Identity confidence at the time of recording.
    pub identity_confidence: f64,
    /// Whether the quality gate validated this round.
    pub validated: bool,
}

/// Records each round's identity and quality gate outcome for later
/// inspection (explain-unk reporting, run summaries).
#[derive(Debug, Clone, Default)]
pub struct GateAuditor {
    log: Vec<GateAuditEntry>,
}

impl GateAuditor {
    /// Create an empty auditor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one round's gate outcome.
    pub fn record(
        &mut self,
        round: u32,
        identity_decision: IdentityGateDecision,
        identity_confidence: f64,
        quality: &QualityGateReport,
    ) {
        self.log.push(GateAuditEntry {
            round,
            timestamp: Utc::now(),
            identity_decision,
            identity_confidence,
            validated: quality.validated,
        });
    }

    /// All recorded entries in round order.
    #[must_use]
    pub fn entries(&self) -> &[GateAuditEntry] {
        &self.log
    }

    /// `true` iff the most recently recorded round validated.
    #[must_use]
    pub fn last_validated(&self) -> bool {
        self.log.last().is_some_and(|e| e.validated)
    }

    /// Number of rounds recorded so far.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing_quality() -> QualityGateReport {
        QualityGateReport {
            completeness_required: 1.0,
            coverage_overall: 1.0,
            confidence: 0.95,
            validated: true,
            validated_reasons: vec![],
        }
    }

    #[test]
    fn records_entries_in_round_order() {
        let mut auditor = GateAuditor::new();
        auditor.record(0, IdentityGateDecision::IdentityUnlocked, 0.2, &passing_quality());
        auditor.record(1, IdentityGateDecision::IdentityLockedFull, 0.99, &passing_quality());
        assert_eq!(auditor.round_count(), 2);
        assert_eq!(auditor.entries()[0].round, 0);
        assert_eq!(auditor.entries()[1].round, 1);
    }

    #[test]
    fn last_validated_reflects_most_recent_round() {
        let mut auditor = GateAuditor::new();
        let mut failing = passing_quality();
        failing.validated = false;
        auditor.record(0, IdentityGateDecision::IdentityUnlocked, 0.2, &failing);
        assert!(!auditor.last_validated());
        auditor.record(1, IdentityGateDecision::IdentityLockedFull, 0.99, &passing_quality());
        assert!(auditor.last_validated());
    }
}
