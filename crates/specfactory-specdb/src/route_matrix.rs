// SPDX-License-Identifier: MIT OR Apache-2.0
//! `llm_route_matrix` persistence: load the configured route matrix at
//! startup, and let admin tooling update it.

use crate::db::SpecDb;
use anyhow::Result;
use rusqlite::params;
use specfactory_routematrix::{RouteCondition, RouteMatrix, RouteRule};
use specfactory_types::RouteDecision;

impl SpecDb {
    /// Upsert one route matrix row.
    pub async fn upsert_route_rule(&self, rule: &RouteRule) -> Result<()> {
        let condition_json = serde_json::to_string(&rule.condition)?;
        let decision_json = serde_json::to_string(&rule.decision)?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO llm_route_matrix (id, description, condition_json, effort, decision_json)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                description = excluded.description,
                condition_json = excluded.condition_json,
                effort = excluded.effort,
                decision_json = excluded.decision_json",
            params![rule.id, rule.description, condition_json, rule.effort, decision_json],
        )?;
        Ok(())
    }

    /// Load every route matrix row into a [`RouteMatrix`] ready to resolve
    /// queries against.
    pub async fn load_route_matrix(&self) -> Result<RouteMatrix> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT id, description, condition_json, effort, decision_json FROM llm_route_matrix")?;
        let rows = stmt.query_map([], |row| {
            let condition_json: String = row.get(2)?;
            let decision_json: String = row.get(4)?;
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, condition_json, row.get::<_, u32>(3)?, decision_json))
        })?;

        let mut matrix = RouteMatrix::new();
        for row in rows {
            let (id, description, condition_json, effort, decision_json) = row?;
            let condition: RouteCondition = serde_json::from_str(&condition_json)?;
            let decision: RouteDecision = serde_json::from_str(&decision_json)?;
            matrix.add_rule(RouteRule { id, description, condition, effort, decision });
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfactory_types::{InsufficientEvidenceAction, RouteScope, SendPacket};

    fn sample_rule() -> RouteRule {
        RouteRule {
            id: "r1".into(),
            description: "scalar fields".into(),
            condition: RouteCondition::ScopeIs(RouteScope::Scalar),
            effort: 1,
            decision: RouteDecision {
                field: "weight".into(),
                scope: RouteScope::Scalar,
                model_ladder: vec!["cheap".into()],
                all_source_data: false,
                enable_websearch: false,
                max_tokens: 1024,
                send_packet: SendPacket::ValuesOnly,
                min_evidence_refs_required: 1,
                insufficient_evidence_action: InsufficientEvidenceAction::Drop,
            },
        }
    }

    #[tokio::test]
    async fn upsert_then_load_round_trips() {
        let db = SpecDb::open_in_memory().await.unwrap();
        db.upsert_route_rule(&sample_rule()).await.unwrap();
        let matrix = db.load_route_matrix().await.unwrap();
        assert_eq!(matrix.rule_count(), 1);
    }

    #[tokio::test]
    async fn upserting_the_same_id_replaces_rather_than_duplicates() {
        let db = SpecDb::open_in_memory().await.unwrap();
        let mut rule = sample_rule();
        db.upsert_route_rule(&rule).await.unwrap();
        rule.effort = 5;
        db.upsert_route_rule(&rule).await.unwrap();
        let matrix = db.load_route_matrix().await.unwrap();
        assert_eq!(matrix.rule_count(), 1);
        assert_eq!(matrix.rules()[0].effort, 5);
    }
}
