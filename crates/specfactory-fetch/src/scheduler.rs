// SPDX-License-Identifier: MIT OR Apache-2.0
//! Fetch Scheduler: bounded-concurrency pool driving one source through the
//! fallback ladder, paced per host (`spec.md` §4.3).

use crate::ladder::{LadderAction, LadderState};
use crate::pacer::HostPacer;
use crate::telemetry::{FetchOutcomeTelemetry, FetchTiming};
use specfactory_capability::{FetchedPage, Fetcher};
use specfactory_types::{FetchMethod, FetchOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Result of driving one source through the fallback ladder to completion.
#[derive(Debug)]
pub enum FetchResult {
    /// A page was fetched successfully.
    Fetched(FetchedPage),
    /// The source was skipped or the ladder was exhausted; no assertions
    /// should be emitted for it (`spec.md` §4.3).
    Failed {
        /// Terminal outcome classification.
        outcome: FetchOutcome,
    },
}

/// Scheduling policy for one run: concurrency, pacing, and retry limits.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Max fetches in flight across all hosts (`spec.md` §4.3 default: 4).
    pub fetch_concurrency: usize,
    /// Minimum delay between fetches to the same host (default 300ms).
    pub host_min_delay: Duration,
    /// Max retries across all fetcher modes combined (default 1).
    pub max_retries: u32,
    /// Delay before retrying a `rate_limited` outcome on the same mode.
    pub rate_limit_retry_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: 4,
            host_min_delay: Duration::from_millis(300),
            max_retries: 1,
            rate_limit_retry_delay: Duration::from_secs(5),
        }
    }
}

/// Drives sources through the fallback ladder under a bounded worker pool,
/// with per-host pacing independent of pool slots.
pub struct FetchScheduler {
    fetcher: Arc<dyn Fetcher>,
    pacer: HostPacer,
    permits: Semaphore,
    config: SchedulerConfig,
}

impl FetchScheduler {
    /// Build a scheduler wrapping the given collaborator fetcher.
    #[must_use]
    pub fn new(fetcher: Arc<dyn Fetcher>, config: SchedulerConfig) -> Self {
        let pacer = HostPacer::new(config.host_min_delay);
        let permits = Semaphore::new(config.fetch_concurrency);
        Self { fetcher, pacer, permits, config }
    }

    /// Fetch one source, running the fallback ladder to completion. Acquires
    /// a pool permit for the whole ladder run (all attempts for one source
    /// count as a single pool slot, matching `spec.md` §4.3's per-source
    /// worker-pool item granularity).
    pub async fn fetch_source(&self, source_id: &str, url: &str, host: &str, starting_mode: FetchMethod) -> (FetchResult, FetchOutcomeTelemetry) {
        let _permit = self.permits.acquire().await.expect("fetch scheduler semaphore closed");
        let mut ladder = LadderState::new(starting_mode, self.config.max_retries);

        loop {
            self.pacer.wait_turn(host).await;
            let started = tokio::time::Instant::now();
            let mode = ladder.current_mode();
            let fetch_result = self.fetcher.fetch(url, mode).await;
            let elapsed_ms = (tokio::time::Instant::now() - started).as_millis() as u64;

            let (page, outcome) = match fetch_result {
                Ok(page) => {
                    let outcome = page.outcome;
                    (Some(page), outcome)
                }
                Err(err) => {
                    warn!(source_id, url, mode = ?mode, error = %err, "fetch attempt errored");
                    (None, FetchOutcome::FetchError)
                }
            };

            match ladder.record(outcome) {
                LadderAction::Done => {
                    info!(source_id, attempts = ladder.attempts(), "fetch succeeded");
                    let telemetry = self.finish_telemetry(source_id, &ladder, elapsed_ms);
                    return (FetchResult::Fetched(page.expect("ok outcome without a page")), telemetry);
                }
                LadderAction::Skip => {
                    let telemetry = self.finish_telemetry(source_id, &ladder, elapsed_ms);
                    return (FetchResult::Failed { outcome }, telemetry);
                }
                LadderAction::TryAlternateFetcher(_) => continue,
                LadderAction::WaitAndRetrySame => {
                    tokio::time::sleep(self.config.rate_limit_retry_delay).await;
                    continue;
                }
                LadderAction::FallbackExhausted => {
                    let telemetry = self.finish_telemetry(source_id, &ladder, elapsed_ms);
                    return (FetchResult::Failed { outcome: FetchOutcome::FallbackExhausted }, telemetry);
                }
            }
        }
    }

    fn finish_telemetry(&self, source_id: &str, ladder: &LadderState, last_attempt_ms: u64) -> FetchOutcomeTelemetry {
        FetchOutcomeTelemetry {
            source_id: source_id.to_string(),
            attempts: ladder.attempts(),
            retry_count: ladder.attempts().saturating_sub(1),
            retry_reasons: ladder.retry_reasons.iter().map(|r| r.to_string()).collect(),
            matched_host_policy: true,
            timing: FetchTiming { navigation_ms: last_attempt_ms, network_idle_ms: 0, replay_ms: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use specfactory_testsupport::MockFetcher;

    #[tokio::test]
    async fn successful_fetch_returns_fetched_result() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(MockFetcher::new().with_html("https://example.com/p", "<html></html>"));
        let scheduler = FetchScheduler::new(fetcher, SchedulerConfig::default());
        let (result, telemetry) = scheduler.fetch_source("src-1", "https://example.com/p", "example.com", FetchMethod::Http).await;
        assert!(matches!(result, FetchResult::Fetched(_)));
        assert_eq!(telemetry.attempts, 1);
        assert_eq!(telemetry.retry_count, 0);
    }

    #[tokio::test]
    async fn not_found_outcome_skips_without_retrying() {
        let fetcher: Arc<dyn Fetcher> = Arc::new(MockFetcher::new());
        let scheduler = FetchScheduler::new(fetcher, SchedulerConfig { max_retries: 1, ..SchedulerConfig::default() });
        let (result, telemetry) = scheduler.fetch_source("src-1", "https://missing.example.com/p", "missing.example.com", FetchMethod::Http).await;
        match result {
            FetchResult::Failed { outcome } => assert_eq!(outcome, FetchOutcome::NotFound),
            FetchResult::Fetched(_) => panic!("expected a failure"),
        }
        assert_eq!(telemetry.attempts, 1);
    }
}
