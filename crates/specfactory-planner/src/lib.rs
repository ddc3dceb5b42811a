// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source Planner: maintains tiered discovery queues for one product run.

use serde::{Deserialize, Serialize};
use specfactory_hostmatch::{normalize_host, HostPolicy};
use specfactory_types::{ProductJob, Tier};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// One URL awaiting a fetch, with the classification metadata the scheduler
/// and consensus engine need downstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlannedUrl {
    /// URL to fetch, or a `helper_files://…` pseudo-URL for synthetic sources.
    pub url: String,
    /// Normalized host.
    pub host: String,
    /// Authority tier.
    pub tier: Tier,
    /// Discovery role hint (`"manufacturer"`, `"database"`, `"retailer"`, `"candidate"`).
    pub role: String,
    /// `true` if this URL was supplied directly in the job's `seed_urls`.
    pub seed: bool,
    /// `true` for helper-file rows: never fetched, candidates are synthesized
    /// directly from the helper database row (`spec.md` §4.2).
    pub synthetic: bool,
}

/// Errors returned while planning or discovering sources.
#[derive(Debug)]
pub enum PlannerError {
    /// `max_urls_per_product` would be exceeded by this enqueue.
    ProductUrlLimitReached {
        /// Configured limit.
        max: usize,
    },
    /// `max_pages_per_domain` would be exceeded for this host.
    DomainPageLimitReached {
        /// Host that hit its per-domain cap.
        host: String,
        /// Configured limit.
        max: usize,
    },
    /// The host glob pattern supplied in planner config failed to compile.
    InvalidHostPolicy(anyhow::Error),
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProductUrlLimitReached { max } => {
                write!(f, "max_urls_per_product reached (max {max})")
            }
            Self::DomainPageLimitReached { host, max } => {
                write!(f, "max_pages_per_domain reached for {host} (max {max})")
            }
            Self::InvalidHostPolicy(e) => write!(f, "invalid host policy: {e}"),
        }
    }
}

impl std::error::Error for PlannerError {}

/// Per-category limits governing planner selection (`spec.md` §4.2).
#[derive(Clone, Debug)]
pub struct PlannerLimits {
    /// Hard cap on total URLs queued across the run for one product.
    pub max_urls_per_product: usize,
    /// Hard cap on pages visited per host.
    pub max_pages_per_domain: usize,
    /// Hosts preferred within a tier, in preference order (job hints).
    pub preferred_hosts: Vec<String>,
}

impl Default for PlannerLimits {
    fn default() -> Self {
        Self {
            max_urls_per_product: 40,
            max_pages_per_domain: 5,
            preferred_hosts: Vec::new(),
        }
    }
}

/// A helper-file database row matched by `(brand, model, variant)`.
///
/// Looked up once during `plan()`; emits a synthetic source carrying
/// pre-extracted field values that never requires a network fetch.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HelperRow {
    /// Stable identifier of the matching helper-database row.
    pub row_id: String,
    /// Pre-extracted `field → value` pairs.
    pub fields: BTreeMap<String, String>,
}

/// Looks up a product's identity tuple in a local helper-file database.
pub trait HelperDatabase {
    /// Return the best-matching row for `(brand, model, variant)`, if any.
    fn lookup(&self, brand: &str, model: &str, variant: Option<&str>) -> Option<HelperRow>;
}

/// A [`HelperDatabase`] with no rows, for categories without a helper file.
#[derive(Default)]
pub struct NoHelperDatabase;

impl HelperDatabase for NoHelperDatabase {
    fn lookup(&self, _brand: &str, _model: &str, _variant: Option<&str>) -> Option<HelperRow> {
        None
    }
}

/// Manufacturer-adjacent subpaths eligible for discovery even off the
/// approved-host list, per `spec.md` §4.2.
const MANUFACTURER_ADJACENT_SUBPATHS: &[&str] = &["/support", "/manual", "/product"];

/// Paths that are never enqueued during discovery, even if their host is approved.
const DISCOVERY_EXCLUDED_PATHS: &[&str] = &["/robots.txt", "/sitemap.xml"];

/// Maintains the `approved` and `candidate` discovery queues for one product run.
pub struct SourcePlanner {
    approved: Vec<PlannedUrl>,
    candidate: Vec<PlannedUrl>,
    limits: PlannerLimits,
    host_policy: HostPolicy,
    visited_hosts: BTreeMap<String, usize>,
    enqueued_urls: HashSet<String>,
    denied_hosts: HashSet<String>,
    total_enqueued: usize,
}

impl SourcePlanner {
    /// Build the initial queues for `job`: seed URLs first, then the
    /// category's approved-host entries, then a synthetic helper source if
    /// the helper database has a matching row.
    pub fn plan(
        job: &ProductJob,
        limits: PlannerLimits,
        approved_hosts: &[String],
        denied_hosts: &[String],
        helpers: &dyn HelperDatabase,
    ) -> Result<Self, PlannerError> {
        let host_policy =
            HostPolicy::new(approved_hosts, denied_hosts).map_err(PlannerError::InvalidHostPolicy)?;
        let mut planner = Self {
            approved: Vec::new(),
            candidate: Vec::new(),
            limits,
            host_policy,
            visited_hosts: BTreeMap::new(),
            enqueued_urls: HashSet::new(),
            denied_hosts: denied_hosts.iter().map(|h| normalize_host(h)).collect(),
            total_enqueued: 0,
        };

        for url in &job.seed_urls {
            let host = host_from_url(url);
            let tier = if planner.host_policy.is_approved_host(&host) {
                Tier::Manufacturer
            } else {
                Tier::Candidate
            };
            let _ = planner.try_enqueue(PlannedUrl {
                url: url.clone(),
                host,
                tier,
                role: "seed".to_string(),
                seed: true,
                synthetic: false,
            });
        }

        if let Some(row) = helpers.lookup(
            &job.identity_lock.brand,
            &job.identity_lock.model,
            job.identity_lock.variant.as_deref(),
        ) {
            let _ = planner.try_enqueue(PlannedUrl {
                url: format!("helper_files://{}", row.row_id),
                host: "helper_files".to_string(),
                tier: Tier::LabDatabase,
                role: "database".to_string(),
                seed: false,
                synthetic: true,
            });
        }

        Ok(planner)
    }

    /// `true` if either queue has an entry left to dequeue.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.approved.is_empty() || !self.candidate.is_empty()
    }

    /// Dequeue the next URL to process.
    ///
    /// Selection order (`spec.md` §4.2): tier ascending, then seed-provided
    /// first, then first-discovered first. The approved queue always drains
    /// before the candidate queue.
    pub fn next(&mut self) -> Option<PlannedUrl> {
        let queue = if !self.approved.is_empty() {
            &mut self.approved
        } else if !self.candidate.is_empty() {
            &mut self.candidate
        } else {
            return None;
        };

        let idx = queue
            .iter()
            .enumerate()
            .min_by_key(|(_, u)| (u.tier, !u.seed))
            .map(|(i, _)| i)?;
        let picked = queue.remove(idx);
        *self.visited_hosts.entry(picked.host.clone()).or_insert(0) += 1;
        Some(picked)
    }

    /// Extract outbound links from a fetched page and enqueue the ones
    /// eligible for discovery.
    ///
    /// A link is eligible if its host is on the category approved list, or
    /// it is a manufacturer-adjacent subpath of `source_url`'s root domain.
    /// Discovery-only paths (`robots.txt`, `sitemap.xml`, search queries)
    /// are never enqueued.
    pub fn discover_from_html(&mut self, source_url: &str, html: &str) {
        let source_root = root_domain(&host_from_url(source_url));
        for link in extract_links(html) {
            if is_discovery_excluded(&link) {
                continue;
            }
            let host = host_from_url(&link);
            if host.is_empty() {
                continue;
            }
            let approved = self.host_policy.is_approved_host(&host);
            let adjacent = root_domain(&host) == source_root
                && MANUFACTURER_ADJACENT_SUBPATHS
                    .iter()
                    .any(|p| link.contains(p));
            if !approved && !adjacent {
                continue;
            }
            let tier = if approved {
                Tier::Manufacturer
            } else {
                Tier::Candidate
            };
            let role = if approved { "manufacturer" } else { "candidate" };
            let _ = self.try_enqueue(PlannedUrl {
                url: link,
                host,
                tier,
                role: role.to_string(),
                seed: false,
                synthetic: false,
            });
        }
    }

    /// Remove `host` from both queues and future selection.
    pub fn block_host(&mut self, host: &str, _reason: &str) {
        let host = normalize_host(host);
        self.denied_hosts.insert(host.clone());
        self.approved.retain(|u| u.host != host);
        self.candidate.retain(|u| u.host != host);
    }

    /// Number of distinct hosts visited (dequeued) so far.
    #[must_use]
    pub fn visited_host_count(&self) -> usize {
        self.visited_hosts.len()
    }

    fn try_enqueue(&mut self, planned: PlannedUrl) -> Result<(), PlannerError> {
        if self.denied_hosts.contains(&planned.host) {
            return Ok(());
        }
        if !self.enqueued_urls.insert(planned.url.clone()) {
            return Ok(());
        }
        if self.total_enqueued >= self.limits.max_urls_per_product {
            return Err(PlannerError::ProductUrlLimitReached {
                max: self.limits.max_urls_per_product,
            });
        }
        let visits = *self.visited_hosts.get(&planned.host).unwrap_or(&0);
        if visits >= self.limits.max_pages_per_domain {
            return Err(PlannerError::DomainPageLimitReached {
                host: planned.host,
                max: self.limits.max_pages_per_domain,
            });
        }
        self.total_enqueued += 1;
        if planned.tier == Tier::Manufacturer || planned.tier == Tier::LabDatabase {
            self.approved.push(planned);
        } else {
            self.candidate.push(planned);
        }
        Ok(())
    }
}

fn is_discovery_excluded(url: &str) -> bool {
    DISCOVERY_EXCLUDED_PATHS.iter().any(|p| url.contains(p)) || url.contains("/search?q=")
}

/// Extract `href="…"` targets from raw HTML without a full DOM parse;
/// the planner only needs the URL strings, not document structure.
fn extract_links(html: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut rest = html;
    while let Some(pos) = rest.find("href=") {
        rest = &rest[pos + 5..];
        let quote = rest.chars().next();
        let (open, close) = match quote {
            Some('"') => ('"', '"'),
            Some('\'') => ('\'', '\''),
            _ => continue,
        };
        rest = &rest[open.len_utf8()..];
        if let Some(end) = rest.find(close) {
            let link = &rest[..end];
            if link.starts_with("http://") || link.starts_with("https://") {
                links.push(link.to_string());
            }
            rest = &rest[end + close.len_utf8()..];
        } else {
            break;
        }
    }
    links
}

fn host_from_url(url: &str) -> String {
    let without_scheme = url
        .split_once("://")
        .map_or(url, |(_, rest)| rest);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("");
    normalize_host(host)
}

fn root_domain(host: &str) -> String {
    let parts: Vec<&str> = host.split('.').collect();
    if parts.len() <= 2 {
        host.to_string()
    } else {
        parts[parts.len() - 2..].join(".")
    }
}
