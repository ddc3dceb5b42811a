//! specfactory-hostmatch
#![deny(unsafe_code)]
//!
//! Host approve/deny glob matching for the Source Planner (`spec.md` §4.2).
//!
//! Category config supplies glob patterns for the approved-host allowlist
//! and a denied-host blocklist; this crate compiles them once into
//! [`globset::GlobSet`] matchers and resolves a normalized host against both.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

/// Result of resolving a host against a [`HostPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDecision {
    /// Host is on the approved list (or no allowlist is configured) and not denied.
    Approved,
    /// Host matched a denied-host pattern. Denial takes precedence over approval.
    DeniedByBlock,
    /// An allowlist is configured and the host matched none of its patterns.
    DeniedByMissingAllow,
}

impl MatchDecision {
    /// Returns `true` only for [`MatchDecision::Approved`].
    #[must_use]
    pub fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// Normalize a host for matching: lowercase, strip a trailing dot, strip a
/// leading `www.`.
///
/// `spec.md` §4.2 requires planner inputs to pass through `normalize_host`
/// before classification so that `WWW.Example.com.` and `example.com` are
/// treated as the same host.
#[must_use]
pub fn normalize_host(host: &str) -> String {
    let lower = host.trim().trim_end_matches('.').to_lowercase();
    lower.strip_prefix("www.").unwrap_or(&lower).to_string()
}

/// Compiled approved/denied glob pair for one category's host policy.
///
/// Denied patterns take precedence: a host matching a deny glob is rejected
/// even if it also matches an approve glob. An empty approve list means "no
/// allowlist constraint" — any host not denied is approved.
#[derive(Debug, Clone)]
pub struct HostPolicy {
    approved: Option<GlobSet>,
    denied: Option<GlobSet>,
}

impl HostPolicy {
    /// Compile approved and denied host glob lists into a reusable matcher.
    pub fn new(approved: &[String], denied: &[String]) -> Result<Self> {
        Ok(Self {
            approved: build_globset(approved)?,
            denied: build_globset(denied)?,
        })
    }

    /// Classify a host, normalizing it first.
    #[must_use]
    pub fn decide(&self, host: &str) -> MatchDecision {
        let host = normalize_host(host);
        if self.denied.as_ref().is_some_and(|set| set.is_match(&host)) {
            return MatchDecision::DeniedByBlock;
        }
        if self
            .approved
            .as_ref()
            .is_some_and(|set| !set.is_match(&host))
        {
            return MatchDecision::DeniedByMissingAllow;
        }
        MatchDecision::Approved
    }

    /// `spec.md` §4.2 `is_approved_host` planner input.
    #[must_use]
    pub fn is_approved_host(&self, host: &str) -> bool {
        self.decide(host).is_approved()
    }

    /// `spec.md` §4.2 `is_denied_host` planner input.
    #[must_use]
    pub fn is_denied_host(&self, host: &str) -> bool {
        matches!(self.decide(host), MatchDecision::DeniedByBlock)
    }
}

/// Compile a list of glob patterns into a [`GlobSet`], returning `None` for empty input.
pub fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(Glob::new(p).with_context(|| format!("invalid host glob: {p}"))?);
    }
    Ok(Some(b.build()?))
}

#[cfg(test)]
mod proptests {
    use super::{normalize_host, HostPolicy};
    use proptest::prelude::*;

    proptest! {
        /// `normalize_host` is idempotent: normalizing an already-normalized
        /// host is a no-op, so callers never need to track whether a host
        /// string has already passed through it.
        #[test]
        fn normalize_host_is_idempotent(host in "[a-zA-Z0-9.-]{1,40}") {
            let once = normalize_host(&host);
            let twice = normalize_host(&once);
            prop_assert_eq!(once, twice);
        }

        /// With no allow or deny patterns configured, every host is
        /// approved regardless of casing, a trailing dot, or a `www.`
        /// prefix (`spec.md` §4.2: "no allowlist constraint").
        #[test]
        fn no_patterns_approves_any_host(host in "[a-zA-Z0-9.-]{1,40}") {
            let policy = HostPolicy::new(&[], &[]).expect("compile empty policy");
            prop_assert!(policy.is_approved_host(&host));
        }

        /// Denying a host by its exact normalized form denies it
        /// regardless of how the caller capitalizes it or appends a
        /// trailing dot or `www.` prefix before the check.
        #[test]
        fn denying_normalized_host_denies_every_casing_variant(host in "[a-z]{1,20}\\.com") {
            let policy = HostPolicy::new(&[], &[host.clone()]).expect("compile deny policy");
            let shouted = host.to_uppercase();
            prop_assert!(policy.is_denied_host(&shouted));
            let prefixed = format!("www.{}.", shouted);
            prop_assert!(policy.is_denied_host(&prefixed));
        }
    }
}
