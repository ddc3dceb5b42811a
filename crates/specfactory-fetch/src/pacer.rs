// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-host minimum delay enforcement, independent of pool concurrency
//! (`spec.md` §4.3, §5 "per-host: fetches are serialized by the host pacer").

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Serializes fetches to the same host, enforcing a minimum delay between
/// successive requests regardless of how many pool slots are free.
#[derive(Debug)]
pub struct HostPacer {
    min_delay: Duration,
    last_fetch: Mutex<HashMap<String, Instant>>,
}

impl HostPacer {
    /// Build a pacer with the given minimum per-host delay (`spec.md` §4.3
    /// default: 300ms).
    #[must_use]
    pub fn new(min_delay: Duration) -> Self {
        Self { min_delay, last_fetch: Mutex::new(HashMap::new()) }
    }

    /// Wait, if necessary, until `min_delay` has elapsed since the last
    /// fetch to `host`, then record this fetch's start time. Two calls for
    /// the same host never overlap in their waits because the lock is held
    /// across the wait-or-not decision, not across the sleep itself.
    pub async fn wait_turn(&self, host: &str) {
        let deadline = {
            let mut last_fetch = self.last_fetch.lock().expect("host pacer mutex poisoned");
            let now = Instant::now();
            let next_allowed = last_fetch.get(host).map_or(now, |t| *t + self.min_delay);
            let reserved = next_allowed.max(now);
            last_fetch.insert(host.to_string(), reserved);
            reserved
        };
        tokio::time::sleep_until(deadline).await;
    }
}

impl Default for HostPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn second_fetch_to_same_host_waits_min_delay() {
        let pacer = HostPacer::new(Duration::from_millis(300));
        let start = Instant::now();
        pacer.wait_turn("example.com").await;
        pacer.wait_turn("example.com").await;
        assert!(Instant::now() - start >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn different_hosts_do_not_serialize_against_each_other() {
        let pacer = HostPacer::new(Duration::from_millis(300));
        let start = Instant::now();
        pacer.wait_turn("a.com").await;
        pacer.wait_turn("b.com").await;
        assert!(Instant::now() - start < Duration::from_millis(300));
    }
}
