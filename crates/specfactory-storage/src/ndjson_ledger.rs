// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`LedgerSink`] that appends billing entries as ndjson lines in blob storage.

use anyhow::Result;
use async_trait::async_trait;
use specfactory_capability::BlobStorage;
use specfactory_llm::{ledger_key, LedgerSink};
use specfactory_types::BillingEntry;
use std::sync::Arc;

/// Writes each [`BillingEntry`] as one ndjson line under the month's ledger
/// key (`spec.md` §6.2), via any [`BlobStorage`] backend.
pub struct NdjsonLedgerSink {
    storage: Arc<dyn BlobStorage>,
}

impl NdjsonLedgerSink {
    /// Wrap `storage` as a ledger sink.
    #[must_use]
    pub fn new(storage: Arc<dyn BlobStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl LedgerSink for NdjsonLedgerSink {
    async fn append(&self, entry: &BillingEntry) -> Result<()> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        self.storage.append(&ledger_key(&entry.month), &line).await
    }
}
