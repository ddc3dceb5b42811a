// SPDX-License-Identifier: MIT OR Apache-2.0
//! A plain-HTTP [`Fetcher`], for `FetchMethod::Http` — the only fetcher
//! mode this workspace drives against the real network. `DynamicBrowser`
//! and `Crawlee` are rendering-backend concerns outside this crate's scope;
//! requesting either from [`HttpFetcher`] reports `FetchError` so the
//! fallback ladder moves on rather than the caller panicking.

use anyhow::Result;
use async_trait::async_trait;
use specfactory_capability::{FetchedPage, Fetcher};
use specfactory_types::{FetchMethod, FetchOutcome};
use std::time::Duration;

/// Fetches pages with a plain `reqwest::Client`, classifying the response
/// into a [`FetchOutcome`] the scheduler's fallback ladder understands.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-request timeout and user agent.
    #[must_use]
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(20), "specfactory/0.1")
    }
}

/// Classify an HTTP status code into a [`FetchOutcome`] (`spec.md` §4.3).
fn classify_status(status: reqwest::StatusCode) -> FetchOutcome {
    if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
        FetchOutcome::NotFound
    } else if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        FetchOutcome::Blocked
    } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        FetchOutcome::RateLimited
    } else if status.is_server_error() {
        FetchOutcome::ServerError
    } else if status.is_success() {
        FetchOutcome::Ok
    } else {
        FetchOutcome::BadContent
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, method: FetchMethod) -> Result<FetchedPage> {
        if method != FetchMethod::Http {
            return Ok(FetchedPage {
                final_url: url.to_string(),
                http_status: None,
                body: Vec::new(),
                outcome: FetchOutcome::FetchError,
            });
        }

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                return Ok(FetchedPage {
                    final_url: url.to_string(),
                    http_status: None,
                    body: Vec::new(),
                    outcome: FetchOutcome::NetworkTimeout,
                });
            }
            Err(_) => {
                return Ok(FetchedPage {
                    final_url: url.to_string(),
                    http_status: None,
                    body: Vec::new(),
                    outcome: FetchOutcome::FetchError,
                });
            }
        };

        let final_url = response.url().to_string();
        let status = response.status();
        let http_status = Some(status.as_u16());
        let outcome = classify_status(status);
        let body = response.bytes().await.map(|b| b.to_vec()).unwrap_or_default();

        Ok(FetchedPage { final_url, http_status, body, outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_common_statuses() {
        assert_eq!(classify_status(reqwest::StatusCode::OK), FetchOutcome::Ok);
        assert_eq!(classify_status(reqwest::StatusCode::NOT_FOUND), FetchOutcome::NotFound);
        assert_eq!(classify_status(reqwest::StatusCode::FORBIDDEN), FetchOutcome::Blocked);
        assert_eq!(classify_status(reqwest::StatusCode::TOO_MANY_REQUESTS), FetchOutcome::RateLimited);
        assert_eq!(classify_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR), FetchOutcome::ServerError);
        assert_eq!(classify_status(reqwest::StatusCode::MOVED_PERMANENTLY), FetchOutcome::BadContent);
    }

    #[tokio::test]
    async fn non_http_method_reports_fetch_error_without_making_a_request() {
        let fetcher = HttpFetcher::default();
        let page = fetcher.fetch("https://example.com", FetchMethod::DynamicBrowser).await.unwrap();
        assert_eq!(page.outcome, FetchOutcome::FetchError);
        assert!(page.body.is_empty());
    }
}
