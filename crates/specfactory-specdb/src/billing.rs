// SPDX-License-Identifier: MIT OR Apache-2.0
//! `billing_entries`: the primary cost-ledger sink (`spec.md` §4.9).

use crate::db::SpecDb;
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::params;
use specfactory_llm::LedgerSink;
use specfactory_types::BillingEntry;

#[async_trait]
impl LedgerSink for SpecDb {
    async fn append(&self, entry: &BillingEntry) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO billing_entries
                (ts, month, day, provider, model, category, product_id, run_id, round,
                 prompt_tokens, completion_tokens, cached_prompt_tokens, cost_usd, reason,
                 host, evidence_chars, estimated_usage)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                entry.ts,
                entry.month,
                entry.day,
                entry.provider,
                entry.model,
                entry.category,
                entry.product_id,
                entry.run_id,
                entry.round,
                entry.prompt_tokens,
                entry.completion_tokens,
                entry.cached_prompt_tokens,
                entry.cost_usd,
                entry.reason,
                entry.host,
                entry.evidence_chars,
                entry.estimated_usage,
            ],
        )?;
        Ok(())
    }
}

impl SpecDb {
    /// Sum of `cost_usd` for every billing entry recorded in `month`
    /// (`YYYY-MM`), used to rebuild the monthly rollup after each append.
    pub async fn monthly_cost_usd(&self, month: &str) -> Result<f64> {
        let conn = self.conn.lock().await;
        let total: Option<f64> = conn.query_row(
            "SELECT SUM(cost_usd) FROM billing_entries WHERE month = ?1",
            params![month],
            |row| row.get(0),
        )?;
        Ok(total.unwrap_or(0.0))
    }

    /// Sum of `cost_usd` for one product run.
    pub async fn product_run_cost_usd(&self, category: &str, product_id: &str, run_id: &str) -> Result<f64> {
        let conn = self.conn.lock().await;
        let total: Option<f64> = conn.query_row(
            "SELECT SUM(cost_usd) FROM billing_entries WHERE category = ?1 AND product_id = ?2 AND run_id = ?3",
            params![category, product_id, run_id],
            |row| row.get(0),
        )?;
        Ok(total.unwrap_or(0.0))
    }
}
