// SPDX-License-Identifier: MIT OR Apache-2.0
//! External collaborator traits and LLM capability validation.
//!
//! `spec.md` §2 names five external collaborators the engine is written
//! against: a Rule Store (consumed via [`specfactory_routematrix`] and
//! [`specfactory_config`]), a Fetcher, a Structured Metadata Parser, an LLM
//! Client, and a blob-KV Storage. This crate defines the latter four traits
//! plus the capability check that gates an LLM call against what the
//! configured client actually supports.

use anyhow::{bail, Result};
use async_trait::async_trait;
use specfactory_types::{FetchMethod, FetchOutcome, RouteDecision};
use std::collections::BTreeSet;

/// Result of one fetch attempt against a URL.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects resolved.
    pub final_url: String,
    /// HTTP status code, if applicable.
    pub http_status: Option<u16>,
    /// Raw response bytes.
    pub body: Vec<u8>,
    /// Classified outcome driving the fallback ladder.
    pub outcome: FetchOutcome,
}

/// Fetches pages over the network or via a rendering backend.
///
/// `spec.md` §4.3: "returns rendered HTML, network JSON, embedded state,
/// screenshots" depending on `method`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` using the given fetcher mode.
    async fn fetch(&self, url: &str, method: FetchMethod) -> Result<FetchedPage>;
}

/// Parses JSON-LD / microdata sidecars out of a fetched page.
#[async_trait]
pub trait StructuredMetadataParser: Send + Sync {
    /// Extract structured product metadata from `url`, if any is present.
    ///
    /// `spec.md` §7: sidecar unavailability fails open — implementations
    /// should return `Ok(None)` rather than erroring when the sidecar
    /// service itself is down, reserving `Err` for malformed responses.
    async fn parse(&self, url: &str, page: &FetchedPage) -> Result<Option<serde_json::Value>>;
}

/// What an LLM backend actually supports, checked against a
/// [`RouteDecision`] before a call is dispatched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmCapabilityManifest {
    /// Model identifiers this backend can serve.
    pub supported_models: BTreeSet<String>,
    /// Whether the backend can perform websearch-augmented calls.
    pub websearch_supported: bool,
    /// Largest `max_tokens` this backend will accept in one call.
    pub max_tokens_ceiling: u32,
}

/// Issues a role-routed LLM call (plan / extract / validate).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// What this backend supports.
    fn capabilities(&self) -> LlmCapabilityManifest;

    /// Issue one call under the given route decision.
    async fn call(&self, route: &RouteDecision, payload: serde_json::Value) -> Result<serde_json::Value>;
}

/// Blob key-value storage with append semantics (`spec.md` §2, §6.2).
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Write `value` at `key`, replacing any existing value.
    async fn put(&self, key: &str, value: &[u8]) -> Result<()>;
    /// Read the value at `key`, if present.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// Append `value` to the blob at `key` (creating it if absent).
    async fn append(&self, key: &str, value: &[u8]) -> Result<()>;
}

/// Verify that `manifest` satisfies everything `route` requires, returning
/// an error naming every unsatisfied requirement.
///
/// Generalizes the requirement-vs-manifest check the teacher crate used for
/// tool/backend capability gating to the LLM-route case (`spec.md` §4.9):
/// at least one ladder model must be servable, websearch support must match,
/// and the token budget must fit under the backend's ceiling.
pub fn ensure_route_supported(route: &RouteDecision, manifest: &LlmCapabilityManifest) -> Result<()> {
    let mut unsatisfied = Vec::new();

    if !route
        .model_ladder
        .iter()
        .any(|m| manifest.supported_models.contains(m))
    {
        unsatisfied.push(format!(
            "no model in ladder {:?} is supported (backend supports {:?})",
            route.model_ladder, manifest.supported_models
        ));
    }
    if route.enable_websearch && !manifest.websearch_supported {
        unsatisfied.push("websearch required but not supported by backend".to_string());
    }
    if route.max_tokens > manifest.max_tokens_ceiling {
        unsatisfied.push(format!(
            "max_tokens {} exceeds backend ceiling {}",
            route.max_tokens, manifest.max_tokens_ceiling
        ));
    }

    if unsatisfied.is_empty() {
        return Ok(());
    }
    bail!("unsatisfied route requirements: {}", unsatisfied.join("; "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfactory_types::{InsufficientEvidenceAction, RouteScope, SendPacket};

    fn route(model_ladder: Vec<&str>, websearch: bool, max_tokens: u32) -> RouteDecision {
        RouteDecision {
            field: "weight".into(),
            scope: RouteScope::Scalar,
            model_ladder: model_ladder.into_iter().map(String::from).collect(),
            all_source_data: false,
            enable_websearch: websearch,
            max_tokens,
            send_packet: SendPacket::ValuesOnly,
            min_evidence_refs_required: 1,
            insufficient_evidence_action: InsufficientEvidenceAction::Drop,
        }
    }

    fn manifest() -> LlmCapabilityManifest {
        LlmCapabilityManifest {
            supported_models: BTreeSet::from(["cheap".to_string(), "strong".to_string()]),
            websearch_supported: false,
            max_tokens_ceiling: 4096,
        }
    }

    #[test]
    fn supported_route_passes() {
        let route = route(vec!["cheap", "strong"], false, 2048);
        assert!(ensure_route_supported(&route, &manifest()).is_ok());
    }

    #[test]
    fn no_supported_model_in_ladder_fails() {
        let route = route(vec!["exotic"], false, 2048);
        let err = ensure_route_supported(&route, &manifest()).unwrap_err();
        assert!(err.to_string().contains("no model in ladder"));
    }

    #[test]
    fn websearch_required_but_unsupported_fails() {
        let route = route(vec!["cheap"], true, 2048);
        let err = ensure_route_supported(&route, &manifest()).unwrap_err();
        assert!(err.to_string().contains("websearch"));
    }

    #[test]
    fn max_tokens_exceeding_ceiling_fails() {
        let route = route(vec!["cheap"], false, 8192);
        let err = ensure_route_supported(&route, &manifest()).unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn multiple_unsatisfied_requirements_are_joined() {
        let route = route(vec!["exotic"], true, 8192);
        let err = ensure_route_supported(&route, &manifest()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("no model in ladder"));
        assert!(msg.contains("websearch"));
        assert!(msg.contains("max_tokens"));
    }
}
