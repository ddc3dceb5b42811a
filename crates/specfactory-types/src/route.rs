//! Route Decision — resolved LLM routing policy for one (field, scope).
//!
//! See `spec.md` §3.7 and §4.9.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The cardinality of the field a route decision applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteScope {
    /// A single scalar field.
    Scalar,
    /// A structured component.
    Component,
    /// A list field.
    List,
}

/// Shape of the LLM request payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SendPacket {
    /// Only already-known field values are sent.
    ValuesOnly,
    /// Known values plus a compact "prime sources" evidence packet.
    ValuesPlusPrimeSources,
}

/// What to do when a candidate cites fewer snippets than required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientEvidenceAction {
    /// Drop the candidate.
    Drop,
    /// Keep the candidate but flag it for review.
    FlagForReview,
}

/// Resolved routing policy for one (field, scope) pair.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RouteDecision {
    /// Field this decision applies to.
    pub field: String,
    /// Cardinality scope.
    pub scope: RouteScope,
    /// Ordered model ladder to try, cheapest first.
    pub model_ladder: Vec<String>,
    /// `true` if the full evidence pack (not just top rows) is sent.
    pub all_source_data: bool,
    /// `true` if websearch tool use is permitted for this call.
    pub enable_websearch: bool,
    /// Output token budget for this call.
    pub max_tokens: u32,
    /// Context-packet shape.
    pub send_packet: SendPacket,
    /// Minimum distinct snippet citations required to accept output.
    pub min_evidence_refs_required: u32,
    /// Disposition when evidence is insufficient.
    pub insufficient_evidence_action: InsufficientEvidenceAction,
}
