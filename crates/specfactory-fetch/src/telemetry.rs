// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-source fetch telemetry (`spec.md` §4.3 "fetch_outcome_telemetry row").

use serde::{Deserialize, Serialize};

/// Navigation/network/replay timing breakdown for one source's fetch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FetchTiming {
    /// Milliseconds spent in page navigation.
    pub navigation_ms: u64,
    /// Milliseconds spent waiting for network idle.
    pub network_idle_ms: u64,
    /// Milliseconds spent replaying captured XHR/GraphQL responses.
    pub replay_ms: u64,
}

/// One row summarizing a source's fetch attempts for the round summary and
/// storage logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchOutcomeTelemetry {
    /// Source this telemetry describes.
    pub source_id: String,
    /// Total attempts across all fetcher modes.
    pub attempts: u32,
    /// Attempts beyond the first.
    pub retry_count: u32,
    /// Reason token recorded for each retry, in order.
    pub retry_reasons: Vec<String>,
    /// `true` if a host allow/deny policy decision drove mode selection.
    pub matched_host_policy: bool,
    /// Timing breakdown for the final (successful or terminal) attempt.
    pub timing: FetchTiming,
}
