// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-category field contracts: consensus rules, effort plans, the route
//! matrix, and search templates (`spec.md` §4.6, §4.9, §4.10).
//!
//! Loaded separately from [`crate::CategoryConfig`] since its members come
//! from the consensus/needset/route-matrix crates and don't carry
//! `schemars::JsonSchema` — this file is an operational artifact, not part
//! of the engine's advertised config schema.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use specfactory_consensus::FieldRule;
use specfactory_needset::FieldPlan;
use specfactory_routematrix::RouteRule;
use std::collections::BTreeMap;
use std::path::Path;

/// Everything the round controller needs to know about one category's
/// fields, beyond the host/budget policy in [`crate::CategoryConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategorySchema {
    /// Per-field consensus policy (`specfactory_consensus::FieldRule`).
    #[serde(default)]
    pub field_rules: Vec<FieldRule>,
    /// Per-field effort-allocation plan (`specfactory_needset::FieldPlan`).
    #[serde(default)]
    pub field_plans: Vec<FieldPlan>,
    /// LLM route matrix rows, highest effort first within ties.
    #[serde(default)]
    pub route_matrix: Vec<RouteRule>,
    /// Search query templates (e.g. `"{brand} {model} {field_name} specs"`).
    #[serde(default)]
    pub search_templates: Vec<String>,
    /// Full non-editorial field list, used only for `coverage_overall`.
    #[serde(default)]
    pub non_editorial_fields: Vec<String>,
    /// Per-field JSON pointer paths to try against network JSON, embedded
    /// state, and structured-metadata payloads, in order
    /// (`specfactory_extract::json::FieldPointerMap`'s shape).
    #[serde(default)]
    pub field_pointers: BTreeMap<String, Vec<String>>,
}

/// Load a [`CategorySchema`] from a JSON file.
pub fn load_category_schema(path: &Path) -> Result<CategorySchema, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.display().to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::ParseError { reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema_round_trips() {
        let schema = CategorySchema::default();
        let json = serde_json::to_string(&schema).unwrap();
        let back: CategorySchema = serde_json::from_str(&json).unwrap();
        assert!(back.field_rules.is_empty());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = load_category_schema(Path::new("/nonexistent/schema.json")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn loads_field_rules_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(
            &path,
            r#"{"field_rules": [{"field": "weight_g", "required_level": "required",
                "conflict_policy": "resolve_by_tier_else_unknown", "plausibility_range": null,
                "numeric_tolerance_pct": null, "min_evidence_refs_effective": 1,
                "allowed_values": null, "pass_target_override": null}]}"#,
        )
        .unwrap();
        let schema = load_category_schema(&path).unwrap();
        assert_eq!(schema.field_rules.len(), 1);
        assert_eq!(schema.field_rules[0].field, "weight_g");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_category_schema(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
