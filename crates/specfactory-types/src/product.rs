//! Product Job — the identity-locking record a run is immutable against.
//!
//! See `spec.md` §3.1 and the `ProductJob` input JSON in §6.1.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The `{brand, model, variant?, sku?, mpn?, gtin?}` tuple locked into a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdentityLock {
    /// Brand name, required.
    pub brand: String,
    /// Model name, required.
    pub model: String,
    /// Optional variant qualifier (e.g. "Pro", "V3").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Optional retailer SKU.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    /// Optional manufacturer part number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mpn: Option<String>,
    /// Optional GTIN/UPC/EAN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtin: Option<String>,
}

impl IdentityLock {
    /// `true` once brand+model and either a variant or a sku are locked,
    /// the threshold `spec.md` §4.7 calls "brand+model+(variant or sku)".
    #[must_use]
    pub fn has_full_lock(&self) -> bool {
        !self.brand.is_empty()
            && !self.model.is_empty()
            && (self.variant.is_some() || self.sku.is_some())
    }
}

/// Completeness/confidence targets and the required-field list for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Requirements {
    /// Fields that must meet pass-target for `validated = true`.
    pub required_fields: Vec<String>,
    /// Minimum `completeness_required` fraction (see `spec.md` §4.8).
    pub target_completeness: f64,
    /// Minimum aggregate `confidence` fraction (see `spec.md` §4.8).
    pub target_confidence: f64,
    /// Fields explicitly nominated for LLM extraction effort.
    #[serde(default)]
    pub llm_target_fields: Vec<String>,
}

/// Hard-locked `{field → expected value}` pairs; contradicting candidates
/// are rejected with `anchor_conflict` (see `spec.md` §4.6 step 1).
pub type Anchors = BTreeMap<String, String>;

/// The immutable identity-locking record a single run processes.
///
/// Per `spec.md` §3.1, this is immutable for the lifetime of the run: the
/// round controller and every downstream component treat `product_id`,
/// `identity_lock`, `requirements`, and `anchors` as read-only inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductJob {
    /// Product category (keys the rule store / route matrix).
    pub category: String,
    /// Stable product slug.
    pub product_id: String,
    /// Locked identity tuple.
    pub identity_lock: IdentityLock,
    /// Completeness/confidence/required-field targets.
    pub requirements: Requirements,
    /// Hard anchor locks.
    #[serde(default)]
    pub anchors: Anchors,
    /// Seed URLs supplied by the caller, fetched before discovery runs.
    #[serde(default)]
    pub seed_urls: Vec<String>,
}
