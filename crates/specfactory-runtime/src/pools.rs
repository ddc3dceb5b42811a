// SPDX-License-Identifier: MIT OR Apache-2.0
//! Worker pools bounding the round controller's concurrent fetch, parse,
//! search, and LLM work (`spec.md` §5).

use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

/// Default concurrent page fetches in flight, matching
/// `specfactory_fetch::SchedulerConfig::default()`'s `fetch_concurrency`.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;
/// Default concurrent HTML/PDF parse+extract tasks.
pub const DEFAULT_PARSE_CONCURRENCY: usize = 4;
/// Default concurrent search-query dispatches against the planner's search
/// backend.
pub const DEFAULT_SEARCH_CONCURRENCY: usize = 2;
/// Default concurrent in-flight LLM calls, independent of the monthly cost
/// budget tracked by `specfactory_llm::BudgetGuard`.
pub const DEFAULT_LLM_CONCURRENCY: usize = 2;

/// Semaphore-gated worker pools shared by every round of a single product
/// run. Cloning is cheap; all clones gate the same underlying semaphores.
#[derive(Clone)]
pub struct Pools {
    fetch: Arc<Semaphore>,
    parse: Arc<Semaphore>,
    search: Arc<Semaphore>,
    llm: Arc<Semaphore>,
}

impl Pools {
    /// Build pools with explicit per-lane concurrency limits.
    #[must_use]
    pub fn new(fetch: usize, parse: usize, search: usize, llm: usize) -> Self {
        Self {
            fetch: Arc::new(Semaphore::new(fetch)),
            parse: Arc::new(Semaphore::new(parse)),
            search: Arc::new(Semaphore::new(search)),
            llm: Arc::new(Semaphore::new(llm)),
        }
    }

    /// Acquire a fetch-lane permit. Held for the lifetime of one
    /// fallback-ladder run (`specfactory_fetch::FetchScheduler::fetch_source`
    /// already serializes internally; this caps how many such runs overlap).
    pub async fn acquire_fetch(&self) -> SemaphorePermit<'_> {
        self.fetch
            .acquire()
            .await
            .expect("fetch pool semaphore closed")
    }

    /// Acquire a parse-lane permit for one extraction pass over a fetched page.
    pub async fn acquire_parse(&self) -> SemaphorePermit<'_> {
        self.parse
            .acquire()
            .await
            .expect("parse pool semaphore closed")
    }

    /// Acquire a search-lane permit for one planner search-query dispatch.
    pub async fn acquire_search(&self) -> SemaphorePermit<'_> {
        self.search
            .acquire()
            .await
            .expect("search pool semaphore closed")
    }

    /// Acquire an LLM-lane permit for one in-flight model call.
    pub async fn acquire_llm(&self) -> SemaphorePermit<'_> {
        self.llm.acquire().await.expect("llm pool semaphore closed")
    }

    /// Number of fetch permits currently available (for telemetry/tests).
    #[must_use]
    pub fn fetch_available(&self) -> usize {
        self.fetch.available_permits()
    }

    /// Number of LLM permits currently available (for telemetry/tests).
    #[must_use]
    pub fn llm_available(&self) -> usize {
        self.llm.available_permits()
    }
}

impl Default for Pools {
    /// Builds pools at `spec.md` §5's documented defaults.
    fn default() -> Self {
        Self::new(
            DEFAULT_FETCH_CONCURRENCY,
            DEFAULT_PARSE_CONCURRENCY,
            DEFAULT_SEARCH_CONCURRENCY,
            DEFAULT_LLM_CONCURRENCY,
        )
    }
}
