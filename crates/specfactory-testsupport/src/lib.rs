// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory fixtures for the external collaborator traits, for use in
//! unit and integration tests across the workspace.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use specfactory_capability::{BlobStorage, FetchedPage, Fetcher, LlmCapabilityManifest, LlmClient, StructuredMetadataParser};
use specfactory_types::{FetchMethod, FetchOutcome, RouteDecision};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A [`Fetcher`] backed by a fixed URL-to-page map.
///
/// URLs not present in the map return `FetchOutcome::NotFound`.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: BTreeMap<String, FetchedPage>,
}

impl MockFetcher {
    /// An empty fetcher; every fetch returns `NotFound`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, page: FetchedPage) -> Self {
        self.pages.insert(url.into(), page);
        self
    }

    /// Register a simple 200-OK HTML response for `url`.
    #[must_use]
    pub fn with_html(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let page = FetchedPage {
            final_url: url.clone(),
            http_status: Some(200),
            body: html.into().into_bytes(),
            outcome: FetchOutcome::Ok,
        };
        self.with_page(url, page)
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, _method: FetchMethod) -> Result<FetchedPage> {
        match self.pages.get(url) {
            Some(page) => Ok(page.clone()),
            None => Ok(FetchedPage {
                final_url: url.to_string(),
                http_status: Some(404),
                body: Vec::new(),
                outcome: FetchOutcome::NotFound,
            }),
        }
    }
}

/// A [`StructuredMetadataParser`] returning a fixed value for every URL, or
/// `None` if none was configured.
#[derive(Debug, Default, Clone)]
pub struct MockStructuredMetadataParser {
    fixed: Option<serde_json::Value>,
}

impl MockStructuredMetadataParser {
    /// A parser that finds no structured metadata on any page.
    #[must_use]
    pub fn empty() -> Self {
        Self { fixed: None }
    }

    /// A parser that returns `value` for every page it sees.
    #[must_use]
    pub fn returning(value: serde_json::Value) -> Self {
        Self { fixed: Some(value) }
    }
}

#[async_trait]
impl StructuredMetadataParser for MockStructuredMetadataParser {
    async fn parse(&self, _url: &str, _page: &FetchedPage) -> Result<Option<serde_json::Value>> {
        Ok(self.fixed.clone())
    }
}

/// A scripted [`LlmClient`] that replays queued responses in call order.
///
/// Calling past the end of the queue is an error, surfacing a test bug
/// (an unexpected extra LLM call) rather than looping the last response.
pub struct MockLlmClient {
    capabilities: LlmCapabilityManifest,
    responses: Mutex<Vec<serde_json::Value>>,
    calls: Mutex<Vec<RouteDecision>>,
}

impl MockLlmClient {
    /// A client that will reply with `responses` in order, one per call.
    #[must_use]
    pub fn new(capabilities: LlmCapabilityManifest, responses: Vec<serde_json::Value>) -> Self {
        Self {
            capabilities,
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every route decision this client was called with, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<RouteDecision> {
        self.calls.lock().expect("mock llm client mutex poisoned").clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn capabilities(&self) -> LlmCapabilityManifest {
        self.capabilities.clone()
    }

    async fn call(&self, route: &RouteDecision, _payload: serde_json::Value) -> Result<serde_json::Value> {
        self.calls
            .lock()
            .expect("mock llm client mutex poisoned")
            .push(route.clone());
        let mut responses = self.responses.lock().expect("mock llm client mutex poisoned");
        if responses.is_empty() {
            return Err(anyhow!("mock llm client exhausted its scripted responses"));
        }
        Ok(responses.remove(0))
    }
}

/// An in-memory [`BlobStorage`].
#[derive(Debug, Default)]
pub struct MockStorage {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MockStorage {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for MockStorage {
    async fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.blobs
            .lock()
            .expect("mock storage mutex poisoned")
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.lock().expect("mock storage mutex poisoned").get(key).cloned())
    }

    async fn append(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut blobs = self.blobs.lock().expect("mock storage mutex poisoned");
        blobs.entry(key.to_string()).or_default().extend_from_slice(value);
        Ok(())
    }
}
