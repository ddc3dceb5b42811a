// SPDX-License-Identifier: MIT OR Apache-2.0
//! `source_evidence_refs` reads and writes.

use crate::db::SpecDb;
use anyhow::Result;
use rusqlite::params;

impl SpecDb {
    /// Record that `candidate_id` (from `source_id`) cites `snippet_id`.
    /// Idempotent: re-recording the same triple is a no-op.
    pub async fn insert_evidence_ref(&self, candidate_id: &str, source_id: &str, snippet_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO source_evidence_refs (candidate_id, source_id, snippet_id) VALUES (?1, ?2, ?3)",
            params![candidate_id, source_id, snippet_id],
        )?;
        Ok(())
    }

    /// Distinct snippet IDs cited by `candidate_id`.
    pub async fn list_evidence_refs(&self, candidate_id: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT snippet_id FROM source_evidence_refs WHERE candidate_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![candidate_id], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_refs_are_not_double_counted() {
        let db = SpecDb::open_in_memory().await.unwrap();
        db.insert_evidence_ref("cand-1", "src-1", "j01").await.unwrap();
        db.insert_evidence_ref("cand-1", "src-1", "j01").await.unwrap();
        db.insert_evidence_ref("cand-1", "src-1", "j02").await.unwrap();
        let refs = db.list_evidence_refs("cand-1").await.unwrap();
        assert_eq!(refs, vec!["j01".to_string(), "j02".to_string()]);
    }
}
