// SPDX-License-Identifier: MIT OR Apache-2.0
//! `candidates` and `source_assertions` reads and writes.

use crate::db::SpecDb;
use anyhow::Result;
use rusqlite::params;
use specfactory_types::{Candidate, CandidateMethod};

fn method_from_str(s: &str) -> CandidateMethod {
    match s {
        "network_json" => CandidateMethod::NetworkJson,
        "embedded_state" => CandidateMethod::EmbeddedState,
        "adapter_api" => CandidateMethod::AdapterApi,
        "json_ld" => CandidateMethod::JsonLd,
        "microdata" => CandidateMethod::Microdata,
        "spec_table" => CandidateMethod::SpecTable,
        "pdf_table" => CandidateMethod::PdfTable,
        "pdf_kv" => CandidateMethod::PdfKv,
        "article_window" => CandidateMethod::ArticleWindow,
        "helper_supportive" => CandidateMethod::HelperSupportive,
        _ => CandidateMethod::LlmExtract,
    }
}

impl SpecDb {
    /// Persist one candidate, replacing any prior row with the same
    /// `candidate_id` (candidate IDs are content-addressed, so a replace is
    /// always a no-op or a confidence/evidence refresh).
    pub async fn insert_candidate(&self, candidate: &Candidate, category: &str, product_id: &str, run_id: &str, round: u32) -> Result<()> {
        let evidence_refs = serde_json::to_string(&candidate.evidence_refs)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO candidates
                (candidate_id, category, product_id, run_id, round, field, value, method,
                 key_path, confidence_base, source_id, evidence_refs)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(candidate_id) DO UPDATE SET
                round = excluded.round,
                evidence_refs = excluded.evidence_refs",
            params![
                candidate.candidate_id,
                category,
                product_id,
                run_id,
                round,
                candidate.field,
                candidate.value,
                candidate.method.as_str(),
                candidate.key_path,
                candidate.confidence_base,
                candidate.source_id,
                evidence_refs,
            ],
        )?;
        Ok(())
    }

    /// Every candidate recorded so far for `field` in one run, across all
    /// rounds (consensus re-evaluates over the full accumulated set).
    pub async fn list_candidates_for_field(&self, category: &str, product_id: &str, run_id: &str, field: &str) -> Result<Vec<Candidate>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT candidate_id, field, value, method, key_path, confidence_base, source_id, evidence_refs
             FROM candidates
             WHERE category = ?1 AND product_id = ?2 AND run_id = ?3 AND field = ?4
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![category, product_id, run_id, field], |row| {
            let method: String = row.get(3)?;
            let evidence_refs_json: String = row.get(7)?;
            Ok((
                Candidate {
                    candidate_id: row.get(0)?,
                    field: row.get(1)?,
                    value: row.get(2)?,
                    method: method_from_str(&method),
                    key_path: row.get(4)?,
                    confidence_base: row.get(5)?,
                    evidence_refs: Vec::new(),
                    source_id: row.get(6)?,
                },
                evidence_refs_json,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (mut candidate, evidence_refs_json) = row?;
            candidate.evidence_refs = serde_json::from_str(&evidence_refs_json)?;
            out.push(candidate);
        }
        Ok(out)
    }

    /// Every candidate recorded so far for this run, across all rounds and
    /// fields. Used by the identity scorer, which needs a source's full
    /// candidate set rather than one field at a time.
    pub async fn list_all_candidates(&self, category: &str, product_id: &str, run_id: &str) -> Result<Vec<Candidate>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT candidate_id, field, value, method, key_path, confidence_base, source_id, evidence_refs
             FROM candidates
             WHERE category = ?1 AND product_id = ?2 AND run_id = ?3
             ORDER BY rowid ASC",
        )?;
        let rows = stmt.query_map(params![category, product_id, run_id], |row| {
            let method: String = row.get(3)?;
            let evidence_refs_json: String = row.get(7)?;
            Ok((
                Candidate {
                    candidate_id: row.get(0)?,
                    field: row.get(1)?,
                    value: row.get(2)?,
                    method: method_from_str(&method),
                    key_path: row.get(4)?,
                    confidence_base: row.get(5)?,
                    evidence_refs: Vec::new(),
                    source_id: row.get(6)?,
                },
                evidence_refs_json,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (mut candidate, evidence_refs_json) = row?;
            candidate.evidence_refs = serde_json::from_str(&evidence_refs_json)?;
            out.push(candidate);
        }
        Ok(out)
    }

    /// Record that `source_id` asserted `raw_value` for `field`, ahead of
    /// candidate construction and shape normalization. This is the review
    /// subsystem's raw-observation feed; the engine only appends here.
    pub async fn insert_source_assertion(&self, source_id: &str, field: &str, raw_value: &str, asserted_at: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO source_assertions (source_id, field, raw_value, asserted_at) VALUES (?1, ?2, ?3, ?4)",
            params![source_id, field, raw_value, asserted_at],
        )?;
        Ok(())
    }
}
