// SPDX-License-Identifier: MIT OR Apache-2.0
#![deny(unsafe_code)]
#![warn(missing_docs)]
//! Fetch Scheduler: bounded-concurrency worker pool, per-host pacing, and
//! fallback-ladder retry policy (`spec.md` §4.3).

mod http;
mod ladder;
mod pacer;
mod scheduler;
mod sidecar;
mod telemetry;

pub use http::HttpFetcher;
pub use ladder::{LadderAction, LadderState};
pub use pacer::HostPacer;
pub use scheduler::{FetchResult, FetchScheduler, SchedulerConfig};
pub use sidecar::{NullMetadataParser, SidecarMetadataParser};
pub use telemetry::{FetchOutcomeTelemetry, FetchTiming};
