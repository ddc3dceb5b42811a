// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection handling and schema for the tables the engine owns
//! (`spec.md` §6.3).

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::sync::Arc;
use tokio::sync::Mutex;

/// SQLite-backed store for the six tables the engine reads and writes:
/// `candidates`, `source_registry`, `source_assertions`,
/// `source_evidence_refs`, `billing_entries`, `llm_route_matrix`.
///
/// `spec.md` §6.3: the engine never writes `item_field_state`,
/// `component_*`, `list_*`, or `key_review_*` — those are the review
/// subsystem's domain and have no tables here.
#[derive(Clone)]
pub struct SpecDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SpecDb {
    /// Open (creating if absent) the database at `path` and ensure the
    /// engine-owned tables exist.
    pub async fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open spec db at {path}"))?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        create_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Open an in-memory database, useful for tests and one-shot CLI runs.
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory spec db")?;
        create_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS source_registry (
            source_id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            product_id TEXT NOT NULL,
            run_id TEXT NOT NULL,
            url TEXT NOT NULL,
            final_url TEXT NOT NULL,
            host TEXT NOT NULL,
            root_domain TEXT NOT NULL,
            tier INTEGER NOT NULL,
            role TEXT NOT NULL,
            fetched_at TEXT NOT NULL,
            http_status INTEGER,
            fetch_method TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            text_hash TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_source_registry_product
            ON source_registry(category, product_id, run_id);

        CREATE TABLE IF NOT EXISTS candidates (
            candidate_id TEXT PRIMARY KEY,
            category TEXT NOT NULL,
            product_id TEXT NOT NULL,
            run_id TEXT NOT NULL,
            round INTEGER NOT NULL,
            field TEXT NOT NULL,
            value TEXT NOT NULL,
            method TEXT NOT NULL,
            key_path TEXT NOT NULL,
            confidence_base REAL NOT NULL,
            source_id TEXT NOT NULL,
            evidence_refs TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_candidates_product_field
            ON candidates(category, product_id, run_id, field);

        CREATE TABLE IF NOT EXISTS source_assertions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_id TEXT NOT NULL,
            field TEXT NOT NULL,
            raw_value TEXT NOT NULL,
            asserted_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_source_assertions_source
            ON source_assertions(source_id, field);

        CREATE TABLE IF NOT EXISTS source_evidence_refs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            candidate_id TEXT NOT NULL,
            source_id TEXT NOT NULL,
            snippet_id TEXT NOT NULL,
            UNIQUE(candidate_id, snippet_id)
        );
        CREATE INDEX IF NOT EXISTS idx_source_evidence_refs_candidate
            ON source_evidence_refs(candidate_id);

        CREATE TABLE IF NOT EXISTS billing_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ts TEXT NOT NULL,
            month TEXT NOT NULL,
            day INTEGER NOT NULL,
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            category TEXT NOT NULL,
            product_id TEXT NOT NULL,
            run_id TEXT NOT NULL,
            round INTEGER NOT NULL,
            prompt_tokens INTEGER NOT NULL,
            completion_tokens INTEGER NOT NULL,
            cached_prompt_tokens INTEGER NOT NULL,
            cost_usd REAL NOT NULL,
            reason TEXT NOT NULL,
            host TEXT NOT NULL,
            evidence_chars INTEGER NOT NULL,
            estimated_usage INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_billing_entries_month ON billing_entries(month);
        CREATE INDEX IF NOT EXISTS idx_billing_entries_product
            ON billing_entries(category, product_id, run_id);

        CREATE TABLE IF NOT EXISTS llm_route_matrix (
            id TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            condition_json TEXT NOT NULL,
            effort INTEGER NOT NULL,
            decision_json TEXT NOT NULL
        );",
    )?;
    Ok(())
}
