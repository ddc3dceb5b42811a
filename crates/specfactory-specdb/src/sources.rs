// SPDX-License-Identifier: MIT OR Apache-2.0
//! `source_registry` reads and writes.

use crate::db::SpecDb;
use anyhow::Result;
use rusqlite::params;
use specfactory_types::{FetchMethod, Source, Tier};

fn fetch_method_str(method: FetchMethod) -> &'static str {
    match method {
        FetchMethod::DynamicBrowser => "dynamic_browser",
        FetchMethod::Http => "http",
        FetchMethod::Crawlee => "crawlee",
        FetchMethod::Synthetic => "synthetic",
    }
}

fn fetch_method_from_str(s: &str) -> FetchMethod {
    match s {
        "dynamic_browser" => FetchMethod::DynamicBrowser,
        "crawlee" => FetchMethod::Crawlee,
        "synthetic" => FetchMethod::Synthetic,
        _ => FetchMethod::Http,
    }
}

impl SpecDb {
    /// Upsert one fetched source into `source_registry`, scoped to the
    /// product run that fetched it.
    pub async fn insert_source(&self, source: &Source, category: &str, product_id: &str, run_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO source_registry
                (source_id, category, product_id, run_id, url, final_url, host, root_domain,
                 tier, role, fetched_at, http_status, fetch_method, content_hash, text_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(source_id) DO UPDATE SET
                final_url = excluded.final_url,
                http_status = excluded.http_status,
                content_hash = excluded.content_hash,
                text_hash = excluded.text_hash,
                fetched_at = excluded.fetched_at",
            params![
                source.source_id,
                category,
                product_id,
                run_id,
                source.url,
                source.final_url,
                source.host,
                source.root_domain,
                source.tier as i64,
                source.role,
                source.fetched_at,
                source.http_status,
                fetch_method_str(source.fetch_method),
                source.content_hash,
                source.text_hash,
            ],
        )?;
        Ok(())
    }

    /// Every source fetched for one run, in insertion order.
    pub async fn list_sources(&self, category: &str, product_id: &str, run_id: &str) -> Result<Vec<Source>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT source_id, url, final_url, host, root_domain, tier, role, fetched_at,
                    http_status, fetch_method, content_hash, text_hash
             FROM source_registry WHERE category = ?1 AND product_id = ?2 AND run_id = ?3
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![category, product_id, run_id], |row| {
            let tier_num: i64 = row.get(5)?;
            let tier = match tier_num {
                1 => Tier::Manufacturer,
                2 => Tier::LabDatabase,
                3 => Tier::Retailer,
                _ => Tier::Candidate,
            };
            let method: String = row.get(9)?;
            Ok(Source {
                source_id: row.get(0)?,
                url: row.get(1)?,
                final_url: row.get(2)?,
                host: row.get(3)?,
                root_domain: row.get(4)?,
                tier,
                role: row.get(6)?,
                fetched_at: row.get(7)?,
                http_status: row.get(8)?,
                fetch_method: fetch_method_from_str(&method),
                content_hash: row.get(10)?,
                text_hash: row.get(11)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(anyhow::Error::from)
    }
}
