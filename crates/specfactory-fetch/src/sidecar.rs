// SPDX-License-Identifier: MIT OR Apache-2.0
//! An HTTP [`StructuredMetadataParser`] backed by an external JSON-LD /
//! microdata sidecar service. Fails open on any transport error per
//! `spec.md` §7 — a sidecar outage must not block the fetch pipeline.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use specfactory_capability::{FetchedPage, StructuredMetadataParser};
use std::time::Duration;

/// Posts a fetched page's URL and body to a configured sidecar endpoint and
/// returns whatever structured product metadata it extracts, if any.
pub struct SidecarMetadataParser {
    client: reqwest::Client,
    endpoint: String,
}

impl SidecarMetadataParser {
    /// Build a parser against `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder().timeout(timeout).build().unwrap_or_default();
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait]
impl StructuredMetadataParser for SidecarMetadataParser {
    async fn parse(&self, url: &str, page: &FetchedPage) -> Result<Option<serde_json::Value>> {
        let body = serde_json::json!({"url": url, "html": String::from_utf8_lossy(&page.body)});

        let response = match self.client.post(&self.endpoint).json(&body).send().await {
            Ok(resp) => resp,
            Err(_) => return Ok(None),
        };

        if !response.status().is_success() {
            return Ok(None);
        }

        let parsed: serde_json::Value =
            response.json().await.context("sidecar returned a malformed response")?;
        if parsed.is_null() {
            return Ok(None);
        }
        match parsed.get("metadata") {
            Some(value) if !value.is_null() => Ok(Some(value.clone())),
            Some(_) => Ok(None),
            None => bail!("sidecar response missing `metadata` field"),
        }
    }
}

/// A sidecar-free [`StructuredMetadataParser`] that always reports no
/// metadata, for categories with `STRUCTURED_METADATA_ENABLED=false`.
pub struct NullMetadataParser;

#[async_trait]
impl StructuredMetadataParser for NullMetadataParser {
    async fn parse(&self, _url: &str, _page: &FetchedPage) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page() -> FetchedPage {
        FetchedPage {
            final_url: "https://example.com".into(),
            http_status: Some(200),
            body: b"<html></html>".to_vec(),
            outcome: specfactory_types::FetchOutcome::Ok,
        }
    }

    #[tokio::test]
    async fn extracts_metadata_from_a_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"metadata": {"brand": "Acme"}})))
            .mount(&server)
            .await;

        let parser = SidecarMetadataParser::new(server.uri(), Duration::from_secs(5));
        let result = parser.parse("https://example.com", &page()).await.unwrap();
        assert_eq!(result, Some(serde_json::json!({"brand": "Acme"})));
    }

    #[tokio::test]
    async fn unreachable_sidecar_fails_open() {
        let parser = SidecarMetadataParser::new("http://127.0.0.1:0/sidecar", Duration::from_secs(1));
        let result = parser.parse("https://example.com", &page()).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn null_parser_always_reports_no_metadata() {
        let result = NullMetadataParser.parse("https://example.com", &page()).await.unwrap();
        assert_eq!(result, None);
    }
}
