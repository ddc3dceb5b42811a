// SPDX-License-Identifier: MIT OR Apache-2.0
//! A plain-HTTP [`LlmClient`], the only concrete backend this workspace
//! drives against a real network endpoint — the same `reqwest::Client`
//! pattern `specfactory-fetch`'s `HttpFetcher` uses for page fetches,
//! applied to the LLM call contract (`spec.md` §4.9).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use specfactory_capability::{LlmCapabilityManifest, LlmClient};
use specfactory_types::RouteDecision;
use std::time::Duration;

/// Calls a single HTTP endpoint expected to accept
/// `{model, field, max_tokens, enable_websearch, payload}` and return
/// `{candidates: [...], usage: {...}}`.
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    manifest: LlmCapabilityManifest,
}

impl HttpLlmClient {
    /// Build a client against `endpoint`, advertising `manifest` as this
    /// backend's capabilities.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, manifest: LlmCapabilityManifest, timeout: Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { client, endpoint: endpoint.into(), api_key, manifest }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    fn capabilities(&self) -> LlmCapabilityManifest {
        self.manifest.clone()
    }

    async fn call(&self, route: &RouteDecision, payload: serde_json::Value) -> Result<serde_json::Value> {
        let model = route
            .model_ladder
            .iter()
            .find(|m| self.manifest.supported_models.contains(*m))
            .context("no model in ladder is supported by this backend")?;

        let body = serde_json::json!({
            "model": model,
            "field": route.field,
            "max_tokens": route.max_tokens.min(self.manifest.max_tokens_ceiling),
            "enable_websearch": route.enable_websearch && self.manifest.websearch_supported,
            "payload": payload,
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("llm backend request failed")?;
        let status = response.status();
        if !status.is_success() {
            bail!("llm backend returned status {status}");
        }
        response.json::<serde_json::Value>().await.context("llm backend returned invalid JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn route(model_ladder: Vec<&str>) -> RouteDecision {
        RouteDecision {
            field: "weight".into(),
            scope: specfactory_types::RouteScope::Scalar,
            model_ladder: model_ladder.into_iter().map(String::from).collect(),
            all_source_data: false,
            enable_websearch: false,
            max_tokens: 1024,
            send_packet: specfactory_types::SendPacket::ValuesOnly,
            min_evidence_refs_required: 1,
            insufficient_evidence_action: specfactory_types::InsufficientEvidenceAction::Drop,
        }
    }

    fn manifest() -> LlmCapabilityManifest {
        LlmCapabilityManifest {
            supported_models: BTreeSet::from(["cheap".to_string()]),
            websearch_supported: false,
            max_tokens_ceiling: 4096,
        }
    }

    #[tokio::test]
    async fn posts_the_call_contract_and_returns_the_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/llm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "cached_prompt_tokens": 0},
            })))
            .mount(&server)
            .await;

        let client = HttpLlmClient::new(format!("{}/llm", server.uri()), None, manifest(), Duration::from_secs(5));
        let response = client.call(&route(vec!["cheap"]), serde_json::json!({"snippets": []})).await.unwrap();
        assert_eq!(response["usage"]["prompt_tokens"], 10);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).and(path("/llm")).respond_with(ResponseTemplate::new(500)).mount(&server).await;

        let client = HttpLlmClient::new(format!("{}/llm", server.uri()), None, manifest(), Duration::from_secs(5));
        assert!(client.call(&route(vec!["cheap"]), serde_json::json!({})).await.is_err());
    }

    #[tokio::test]
    async fn unsupported_model_ladder_fails_before_any_request() {
        let client = HttpLlmClient::new("http://127.0.0.1:0/llm", None, manifest(), Duration::from_secs(5));
        let err = client.call(&route(vec!["exotic"]), serde_json::json!({})).await.unwrap_err();
        assert!(err.to_string().contains("no model"));
    }
}
