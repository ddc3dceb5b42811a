// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Route matrix: prioritized, composable conditions resolving a
//! `(field, scope, required_level)` triple to a [`RouteDecision`]
//! (`spec.md` §4.9).

use globset::Glob;
use serde::{Deserialize, Serialize};
use specfactory_types::{RouteDecision, RouteScope};

/// A composable predicate deciding whether a route row applies to a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCondition {
    /// Matches every field.
    Always,
    /// Matches no field.
    Never,
    /// Matches field names satisfying the glob pattern (e.g. `"encoder_*"`).
    FieldPattern(String),
    /// Matches a specific cardinality scope.
    ScopeIs(RouteScope),
    /// Matches a specific `required_level` (`"required"` / `"expected"` / other).
    RequiredLevelIs(String),
    /// All child conditions must match.
    And(Vec<RouteCondition>),
    /// At least one child condition must match.
    Or(Vec<RouteCondition>),
    /// Negates the inner condition.
    Not(Box<RouteCondition>),
}

/// The (field, scope, required_level) key a route row is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct RouteQuery<'a> {
    /// Field name.
    pub field: &'a str,
    /// Cardinality scope.
    pub scope: RouteScope,
    /// Required level string from the field rule.
    pub required_level: &'a str,
}

impl RouteCondition {
    /// Evaluate this condition against `query`.
    #[must_use]
    pub fn matches(&self, query: &RouteQuery<'_>) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::FieldPattern(pat) => Glob::new(pat)
                .ok()
                .is_some_and(|g| g.compile_matcher().is_match(query.field)),
            Self::ScopeIs(scope) => *scope == query.scope,
            Self::RequiredLevelIs(level) => level == query.required_level,
            Self::And(conds) => conds.iter().all(|c| c.matches(query)),
            Self::Or(conds) => conds.iter().any(|c| c.matches(query)),
            Self::Not(inner) => !inner.matches(query),
        }
    }
}

/// One row of the route matrix: a condition, an effort rank, and the
/// resolved policy to apply when it wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// Unique identifier for the row.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Condition that must be met for this row to apply.
    pub condition: RouteCondition,
    /// Effort rank; higher effort wins among matching rows (`spec.md` §4.9:
    /// "rank by effort desc, min_evidence_refs desc").
    pub effort: u32,
    /// The policy this row resolves to when selected.
    pub decision: RouteDecision,
}

/// Engine resolving a [`RouteQuery`] to the highest-ranked matching
/// [`RouteDecision`].
#[derive(Debug, Clone, Default)]
pub struct RouteMatrix {
    rows: Vec<RouteRule>,
}

impl RouteMatrix {
    /// Create an empty route matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the matrix.
    pub fn add_rule(&mut self, rule: RouteRule) {
        self.rows.push(rule);
    }

    /// Resolve `query` to the winning [`RouteDecision`], ranking matching
    /// rows by `(effort desc, min_evidence_refs_required desc)` and breaking
    /// remaining ties by insertion order (earlier row wins).
    #[must_use]
    pub fn resolve(&self, query: &RouteQuery<'_>) -> Option<&RouteDecision> {
        self.rows
            .iter()
            .filter(|r| r.condition.matches(query))
            .max_by_key(|r| (r.effort, r.decision.min_evidence_refs_required))
            .map(|r| &r.decision)
    }

    /// Evaluate every row against `query`, returning `(rule_id, matched)` pairs.
    #[must_use]
    pub fn evaluate_all(&self, query: &RouteQuery<'_>) -> Vec<(String, bool)> {
        self.rows
            .iter()
            .map(|r| (r.id.clone(), r.condition.matches(query)))
            .collect()
    }

    /// Borrow the current row list.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rows
    }

    /// Remove a row by its id. Does nothing if no such row exists.
    pub fn remove_rule(&mut self, id: &str) {
        self.rows.retain(|r| r.id != id);
    }

    /// Number of rows currently registered.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rows.len()
    }
}
