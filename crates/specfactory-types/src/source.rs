//! A fetched URL and the fallback-ladder outcome its fetch produced.
//!
//! See `spec.md` §3.2 and the fallback-ladder table in §4.3.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Source authority tier. Lower numbers dominate ties in consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Manufacturer-owned domains.
    Manufacturer = 1,
    /// Lab/database sources (review labs, spec databases, helper files).
    LabDatabase = 2,
    /// Retailer product pages.
    Retailer = 3,
    /// Discovered candidate-tier hosts.
    Candidate = 4,
}

impl Tier {
    /// Relative scoring weight used by the consensus engine (`spec.md` §4.6
    /// step 3): T1=1.0, T2=0.9, T3=0.7, T4=0.5.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Self::Manufacturer => 1.0,
            Self::LabDatabase => 0.9,
            Self::Retailer => 0.7,
            Self::Candidate => 0.5,
        }
    }

    /// Minimum identity score required for a source at this tier to count
    /// as a match (`spec.md` §4.7).
    #[must_use]
    pub fn identity_match_threshold(self) -> f64 {
        match self {
            Self::Manufacturer | Self::LabDatabase => 0.75,
            Self::Retailer => 0.85,
            Self::Candidate => 0.95,
        }
    }
}

/// Fetcher mode selected by category policy or per-host override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchMethod {
    /// Full-render browser fetch, captures XHR/GraphQL.
    DynamicBrowser,
    /// Plain HTTP fetch.
    Http,
    /// Orchestrated crawl (crawlee-style).
    Crawlee,
    /// Not fetched over the network; a synthetic helper-file source.
    Synthetic,
}

/// Classified result of one fetch attempt, driving the fallback ladder in
/// `spec.md` §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Fetch succeeded.
    Ok,
    /// Resource does not exist.
    NotFound,
    /// Content did not look like a product page.
    BadContent,
    /// Content appears to sit behind a login wall.
    LoginWall,
    /// Bot-detection or access blocked the request.
    Blocked,
    /// Bot challenge (CAPTCHA-style) was presented.
    BotChallenge,
    /// Server returned a 5xx.
    ServerError,
    /// Navigation/network-idle deadline exceeded.
    NetworkTimeout,
    /// Fetcher raised a generic network/transport error.
    FetchError,
    /// Rate limited; wait and retry the same mode.
    RateLimited,
    /// All fallback-ladder modes were exhausted without success.
    FallbackExhausted,
}

impl FetchOutcome {
    /// `true` when the ladder should try the next fetcher mode.
    #[must_use]
    pub fn should_try_alternate_fetcher(self) -> bool {
        matches!(
            self,
            Self::Blocked
                | Self::BotChallenge
                | Self::ServerError
                | Self::NetworkTimeout
                | Self::FetchError
        )
    }

    /// `true` when the ladder should skip the source entirely (no retry).
    #[must_use]
    pub fn should_skip(self) -> bool {
        matches!(self, Self::NotFound | Self::BadContent | Self::LoginWall)
    }

    /// `true` when the ladder should wait and retry the same mode.
    #[must_use]
    pub fn should_wait_and_retry(self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// A fetched URL. One row per `(product, host, run)` per `spec.md` §3.2.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Source {
    /// `category::product_id::host::run_id`.
    pub source_id: String,
    /// Original requested URL.
    pub url: String,
    /// URL after redirects resolved.
    pub final_url: String,
    /// Registrable host (e.g. `www.logitechg.com`).
    pub host: String,
    /// eTLD+1 root domain (e.g. `logitechg.com`).
    pub root_domain: String,
    /// Authority tier.
    pub tier: Tier,
    /// Discovery role hint (e.g. `"manufacturer"`, `"database"`, `"retailer"`).
    pub role: String,
    /// RFC 3339 fetch timestamp.
    pub fetched_at: String,
    /// HTTP status code, if applicable.
    pub http_status: Option<u16>,
    /// Fetcher mode that produced this fetch.
    pub fetch_method: FetchMethod,
    /// SHA-256 of the raw page bytes.
    pub content_hash: String,
    /// SHA-256 of the extracted plain text.
    pub text_hash: String,
}

impl Source {
    /// Deterministic `source_id` per `spec.md` §3.2.
    #[must_use]
    pub fn make_id(category: &str, product_id: &str, host: &str, run_id: &str) -> String {
        format!("{category}::{product_id}::{host}::{run_id}")
    }
}
